// Color string parsing shared by configuration validation and the renderers

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while_m_n},
    character::complete::{char, multispace0, u8 as dec_u8},
    combinator::{all_consuming, map, map_res},
    sequence::{delimited, preceded, tuple},
    IResult,
};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb` form, understood by both back ends
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Parse a color string: `#rrggbb`, `#rgb`, `rgb(r, g, b)`, a named color or a
/// single-letter matplotlib shorthand (`r`, `k`, ...).
pub fn parse_color(color_str: &str) -> Option<Rgb> {
    let color_str = color_str.trim();
    if let Ok((_, rgb)) = all_consuming(alt((hex_color, rgb_function)))(color_str) {
        return Some(rgb);
    }
    named_color(color_str)
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn hex_pair(input: &str) -> IResult<&str, u8> {
    map_res(
        take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
        |s: &str| u8::from_str_radix(s, 16),
    )(input)
}

fn hex_single(input: &str) -> IResult<&str, u8> {
    map(
        map_res(
            take_while_m_n(1, 1, |c: char| c.is_ascii_hexdigit()),
            |s: &str| u8::from_str_radix(s, 16),
        ),
        |v| v * 17,
    )(input)
}

/// #RRGGBB or #RGB
fn hex_color(input: &str) -> IResult<&str, Rgb> {
    preceded(
        char('#'),
        alt((
            all_consuming(map(tuple((hex_pair, hex_pair, hex_pair)), |(r, g, b)| Rgb(r, g, b))),
            all_consuming(map(tuple((hex_single, hex_single, hex_single)), |(r, g, b)| Rgb(r, g, b))),
        )),
    )(input)
}

/// rgb(228, 26, 28)
fn rgb_function(input: &str) -> IResult<&str, Rgb> {
    let (input, _) = ws(tag_no_case("rgb"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, r) = ws(dec_u8)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, g) = ws(dec_u8)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, b) = ws(dec_u8)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, Rgb(r, g, b)))
}

fn named_color(name: &str) -> Option<Rgb> {
    // single letters are case-sensitive in matplotlib
    match name {
        "r" => return Some(Rgb(255, 0, 0)),
        "g" => return Some(Rgb(0, 128, 0)),
        "b" => return Some(Rgb(0, 0, 255)),
        "c" => return Some(Rgb(0, 191, 191)),
        "m" => return Some(Rgb(191, 0, 191)),
        "y" => return Some(Rgb(191, 191, 0)),
        "k" => return Some(Rgb(0, 0, 0)),
        "w" => return Some(Rgb(255, 255, 255)),
        _ => {}
    }

    match name.to_lowercase().as_str() {
        "white" => Some(Rgb(255, 255, 255)),
        "black" => Some(Rgb(0, 0, 0)),
        "red" => Some(Rgb(255, 0, 0)),
        "green" => Some(Rgb(0, 128, 0)),
        "blue" => Some(Rgb(0, 0, 255)),
        "yellow" => Some(Rgb(255, 255, 0)),
        "cyan" => Some(Rgb(0, 255, 255)),
        "magenta" => Some(Rgb(255, 0, 255)),
        "orange" => Some(Rgb(255, 165, 0)),
        "purple" => Some(Rgb(128, 0, 128)),
        "pink" => Some(Rgb(255, 192, 203)),
        "brown" => Some(Rgb(139, 69, 19)),
        "gray" | "grey" => Some(Rgb(128, 128, 128)),
        "darkgray" | "darkgrey" => Some(Rgb(64, 64, 64)),
        "lightgray" | "lightgrey" => Some(Rgb(192, 192, 192)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_long() {
        assert_eq!(parse_color("#e41a1c"), Some(Rgb(228, 26, 28)));
        assert_eq!(parse_color("  #377EB8 "), Some(Rgb(55, 126, 184)));
    }

    #[test]
    fn test_parse_hex_short() {
        assert_eq!(parse_color("#fff"), Some(Rgb(255, 255, 255)));
        assert_eq!(parse_color("#636"), Some(Rgb(102, 51, 102)));
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert_eq!(parse_color("#abcd"), None);
        assert_eq!(parse_color("#gggggg"), None);
        assert_eq!(parse_color("#"), None);
    }

    #[test]
    fn test_parse_rgb_function() {
        assert_eq!(parse_color("rgb(228, 26, 28)"), Some(Rgb(228, 26, 28)));
        assert_eq!(parse_color("RGB( 1 ,2,3 )"), Some(Rgb(1, 2, 3)));
        assert_eq!(parse_color("rgb(256, 0, 0)"), None);
        assert_eq!(parse_color("rgb(1, 2)"), None);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse_color("Orange"), Some(Rgb(255, 165, 0)));
        assert_eq!(parse_color("k"), Some(Rgb(0, 0, 0)));
        assert_eq!(parse_color("K"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgb(228, 26, 28).to_hex(), "#e41a1c");
    }
}
