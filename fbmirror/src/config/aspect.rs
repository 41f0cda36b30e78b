//! Parses aspect ratios given on the command line.
use crate::error::ConfigError;

/// Parse `A:B` (meaning `A / B`) or a decimal number.
pub fn parse_aspect(s: &str) -> Result<f64, ConfigError> {
    let bad = || ConfigError::BadAspect(s.to_owned());
    let s_trimmed = s.trim();

    let value = if let Some(i) = s_trimmed.find(':') {
        let (num, den) = (&s_trimmed[..i], &s_trimmed[i + 1..]);
        let num: u32 = num.trim().parse().map_err(|_| bad())?;
        let den: u32 = den.trim().parse().map_err(|_| bad())?;
        if den == 0 {
            return Err(bad());
        }
        f64::from(num) / f64::from(den)
    } else {
        s_trimmed.parse::<f64>().map_err(|_| bad())?
    };

    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(bad())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio() {
        assert_eq!(parse_aspect("16:9"), Ok(16.0 / 9.0));
        assert_eq!(parse_aspect("4:3"), Ok(4.0 / 3.0));
        assert_eq!(parse_aspect(" 3 : 2 "), Ok(1.5));
    }

    #[test]
    fn decimal() {
        assert_eq!(parse_aspect("1.5"), Ok(1.5));
        assert_eq!(parse_aspect("2"), Ok(2.0));
        assert_eq!(parse_aspect("1.7777"), Ok(1.7777));
    }

    #[test]
    fn rejects_garbage() {
        for &s in &[
            "", ":", "16:", ":9", "16:0", "0:9", "a:b", "16:9:1", "-1.5", "0", "0.0", "abc",
            "NaN", "inf", "-4:3",
        ] {
            assert_eq!(
                parse_aspect(s),
                Err(ConfigError::BadAspect(s.to_owned())),
                "{:?}",
                s
            );
        }
    }
}
