//! Text codec for one label line: `<class> <xc> <yc> <w> <h>`

use super::boxes::NormalizedBox;
use thiserror::Error;

/// Number of whitespace separated tokens on a well-formed line
pub const TOKENS_PER_LINE: usize = 5;

/// Why a label line was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedLine {
    #[error("expected 5 tokens, found {0}")]
    TokenCount(usize),
    #[error("invalid class id '{0}'")]
    ClassId(String),
    #[error("invalid coordinate '{0}'")]
    Coordinate(String),
}

/// Format a box with six decimals, space separated, no trailing newline
pub fn encode_line(bbox: &NormalizedBox) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        bbox.class_id, bbox.x_center, bbox.y_center, bbox.width, bbox.height
    )
}

/// Parse one line. Coordinates are accepted as-is, even slightly outside `[0, 1]`.
pub fn decode_line(line: &str) -> Result<NormalizedBox, MalformedLine> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != TOKENS_PER_LINE {
        return Err(MalformedLine::TokenCount(parts.len()));
    }

    let class_id = parse_class_id(parts[0])?;

    let mut values = [0.0f64; 4];
    for (slot, token) in values.iter_mut().zip(&parts[1..]) {
        *slot = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| MalformedLine::Coordinate(token.to_string()))?;
    }

    let [x_center, y_center, width, height] = values;
    Ok(NormalizedBox::new(class_id, x_center, y_center, width, height))
}

/// Class ids are integers, but some exporters write them as `0.0`
fn parse_class_id(token: &str) -> Result<u32, MalformedLine> {
    if let Ok(id) = token.parse::<u32>() {
        return Ok(id);
    }

    match token.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => {
            Ok(v as u32)
        }
        _ => Err(MalformedLine::ClassId(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::PixelBox;

    #[test]
    fn test_encode_fixed_precision() {
        let b = NormalizedBox::new(0, 0.544132, 0.301534, 0.0664062, 0.0865143);
        assert_eq!(encode_line(&b), "0 0.544132 0.301534 0.066406 0.086514");
    }

    #[test]
    fn test_decode_accepts_five_tokens() {
        let b = decode_line("  2 0.5 0.25\t0.1 0.2  ").unwrap();
        assert_eq!(b, NormalizedBox::new(2, 0.5, 0.25, 0.1, 0.2));
    }

    #[test]
    fn test_decode_float_class_id() {
        assert_eq!(decode_line("1.0 0.5 0.5 0.1 0.1").unwrap().class_id, 1);
        assert!(matches!(
            decode_line("1.5 0.5 0.5 0.1 0.1"),
            Err(MalformedLine::ClassId(_))
        ));
        assert!(matches!(
            decode_line("-1 0.5 0.5 0.1 0.1"),
            Err(MalformedLine::ClassId(_))
        ));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode_line(""), Err(MalformedLine::TokenCount(0)));
        assert_eq!(
            decode_line("0 0.5 0.5 0.1"),
            Err(MalformedLine::TokenCount(4))
        );
        assert_eq!(
            decode_line("0 0.5 0.5 0.1 0.1 0.9"),
            Err(MalformedLine::TokenCount(6))
        );
        assert!(matches!(
            decode_line("0 0.5 abc 0.1 0.1"),
            Err(MalformedLine::Coordinate(_))
        ));
        assert!(matches!(
            decode_line("0 0.5 NaN 0.1 0.1"),
            Err(MalformedLine::Coordinate(_))
        ));
    }

    #[test]
    fn test_decode_tolerates_out_of_range() {
        let b = decode_line("0 1.02 -0.01 0.1 0.1").unwrap();
        assert!(b.x_center > 1.0);
        assert!(b.y_center < 0.0);
    }

    #[test]
    fn test_label_round_trip_on_800x600() {
        let original = PixelBox::new(100, 50, 300, 250);
        let line = encode_line(&original.to_normalized(0, 800, 600));
        let back = decode_line(&line).unwrap().to_pixel(800, 600);

        for (a, b) in [
            (original.x1, back.x1),
            (original.y1, back.y1),
            (original.x2, back.x2),
            (original.y2, back.y2),
        ] {
            assert!((a - b).abs() <= 1, "{a} vs {b}");
        }
    }
}
