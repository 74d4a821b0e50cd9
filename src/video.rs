//! Video filename templates
//!
//! `commands.record.videoname` is a format template with exactly one
//! positional integer slot for the take index, e.g.
//! `'airraid_vid_{:04}.avi'`. Supported specs are `{}` and `{:N}` /
//! `{:0N}` for (zero-)padded width N. `{{` and `}}` are literal braces.

use crate::error::TemplateError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTemplate {
    prefix: String,
    suffix: String,
    width: usize,
    zero_pad: bool,
}

impl VideoTemplate {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut slots: Vec<String> = Vec::new();
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            let literal = if slots.is_empty() { &mut prefix } else { &mut suffix };
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut spec = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(inner) => spec.push(inner),
                            None => return Err(TemplateError::UnbalancedBraces),
                        }
                    }
                    slots.push(spec);
                }
                '}' => return Err(TemplateError::UnbalancedBraces),
                other => literal.push(other),
            }
        }

        match slots.len() {
            0 => return Err(TemplateError::NoSlot),
            1 => {}
            count => return Err(TemplateError::MultipleSlots { count }),
        }

        let (width, zero_pad) = parse_spec(&slots[0])?;
        Ok(Self {
            prefix,
            suffix,
            width,
            zero_pad,
        })
    }

    /// Render the filename for one take index
    pub fn render(&self, take: u64) -> String {
        let digits = take.to_string();
        let mut out = String::with_capacity(self.prefix.len() + self.suffix.len() + 8);
        out.push_str(&self.prefix);
        let pad = self.width.saturating_sub(digits.len());
        for _ in 0..pad {
            out.push(if self.zero_pad { '0' } else { ' ' });
        }
        out.push_str(&digits);
        out.push_str(&self.suffix);
        out
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

/// Parse a slot spec: empty, `:N` or `:0N`
fn parse_spec(spec: &str) -> Result<(usize, bool), TemplateError> {
    if spec.is_empty() {
        return Ok((0, false));
    }
    let unsupported = || TemplateError::UnsupportedSpec {
        spec: spec.to_string(),
    };
    let rest = spec.strip_prefix(':').ok_or_else(unsupported)?;
    if rest.is_empty() {
        return Ok((0, false));
    }
    let (zero_pad, digits) = match rest.strip_prefix('0') {
        Some(d) if !d.is_empty() => (true, d),
        _ => (false, rest),
    };
    let width: usize = digits.parse().map_err(|_| unsupported())?;
    Ok((width, zero_pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_padded_slot() {
        let t = VideoTemplate::parse("airraid_vid_{:04}.avi").unwrap();
        assert_eq!(t.width(), 4);
        assert_eq!(t.render(0), "airraid_vid_0000.avi");
        assert_eq!(t.render(17), "airraid_vid_0017.avi");
        assert_eq!(t.render(123456), "airraid_vid_123456.avi");
    }

    #[test]
    fn test_bare_slot() {
        let t = VideoTemplate::parse("run_{}.avi").unwrap();
        assert_eq!(t.render(7), "run_7.avi");
    }

    #[test]
    fn test_space_padded_slot() {
        let t = VideoTemplate::parse("take{:3}.avi").unwrap();
        assert_eq!(t.render(5), "take  5.avi");
    }

    #[test]
    fn test_literal_braces() {
        let t = VideoTemplate::parse("odd{{name}}_{:02}.avi").unwrap();
        assert_eq!(t.render(1), "odd{name}_01.avi");
    }

    #[test]
    fn test_rejects_bad_templates() {
        assert_eq!(
            VideoTemplate::parse("no_slot.avi"),
            Err(TemplateError::NoSlot)
        );
        assert_eq!(
            VideoTemplate::parse("{}_{}.avi"),
            Err(TemplateError::MultipleSlots { count: 2 })
        );
        assert_eq!(
            VideoTemplate::parse("dangling_{:04.avi"),
            Err(TemplateError::UnbalancedBraces)
        );
        assert_eq!(
            VideoTemplate::parse("stray_}.avi"),
            Err(TemplateError::UnbalancedBraces)
        );
        assert!(matches!(
            VideoTemplate::parse("float_{:.2}.avi"),
            Err(TemplateError::UnsupportedSpec { .. })
        ));
    }
}
