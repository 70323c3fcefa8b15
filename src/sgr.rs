//! SGR (Select Graphic Rendition) parameter application.
//!
//! Handles both `;` and `:` tokenizations of the extended color and
//! underline forms: `38;2;r;g;b` and `38:2:r:g:b` select the same color.
//! Unrecognized parameters are skipped.

use crate::cell::{AttrFlags, Attributes, UnderlineStyle};
use crate::color::Color;
use crate::parser::Params;

/// Apply an SGR parameter list to the rendition state.
pub fn apply(attrs: &mut Attributes, params: &Params) {
    if params.is_empty() {
        reset(attrs);
        return;
    }
    let mut i = 0;
    while i < params.len() {
        let group = params.group(i);
        let code = group.first().copied().unwrap_or(0);
        match code {
            0 => reset(attrs),
            1 => attrs.flags.insert(AttrFlags::BOLD),
            2 => attrs.flags.insert(AttrFlags::DIM),
            3 => attrs.flags.insert(AttrFlags::ITALIC),
            4 => {
                attrs.underline = group
                    .get(1)
                    .copied()
                    .map_or(Some(UnderlineStyle::Single), UnderlineStyle::from_sgr)
                    .unwrap_or(attrs.underline);
            }
            5 => attrs.flags.insert(AttrFlags::BLINK),
            7 => attrs.flags.insert(AttrFlags::INVERSE),
            8 => attrs.flags.insert(AttrFlags::HIDDEN),
            9 => attrs.flags.insert(AttrFlags::STRIKETHROUGH),
            21 => attrs.underline = UnderlineStyle::Double,
            22 => attrs.flags.remove(AttrFlags::BOLD | AttrFlags::DIM),
            23 => attrs.flags.remove(AttrFlags::ITALIC),
            24 => attrs.underline = UnderlineStyle::None,
            25 => attrs.flags.remove(AttrFlags::BLINK),
            27 => attrs.flags.remove(AttrFlags::INVERSE),
            28 => attrs.flags.remove(AttrFlags::HIDDEN),
            29 => attrs.flags.remove(AttrFlags::STRIKETHROUGH),
            30..=37 => attrs.fg = Color::Indexed(code as u8 - 30),
            38 => {
                if group.len() > 1 {
                    if let Some(color) = extended_color(&group[1..]) {
                        attrs.fg = color;
                    }
                } else if let Some((color, consumed)) = extended_color_groups(params, i + 1) {
                    attrs.fg = color;
                    i += consumed;
                }
            }
            39 => attrs.fg = Color::Default,
            40..=47 => attrs.bg = Color::Indexed(code as u8 - 40),
            48 => {
                if group.len() > 1 {
                    if let Some(color) = extended_color(&group[1..]) {
                        attrs.bg = color;
                    }
                } else if let Some((color, consumed)) = extended_color_groups(params, i + 1) {
                    attrs.bg = color;
                    i += consumed;
                }
            }
            49 => attrs.bg = Color::Default,
            90..=97 => attrs.fg = Color::Indexed(code as u8 - 90 + 8),
            100..=107 => attrs.bg = Color::Indexed(code as u8 - 100 + 8),
            _ => {}
        }
        i += 1;
    }
}

fn reset(attrs: &mut Attributes) {
    attrs.fg = Color::Default;
    attrs.bg = Color::Default;
    attrs.flags = AttrFlags::empty();
    attrs.underline = UnderlineStyle::None;
}

/// Colon form: the selector and its arguments share one group, with an
/// optional colorspace slot (`38:2::r:g:b`).
fn extended_color(spec: &[u16]) -> Option<Color> {
    match spec.first()? {
        5 => spec.get(1).map(|&n| Color::Indexed(n.min(255) as u8)),
        2 => {
            let rgb = if spec.len() >= 5 {
                &spec[2..5]
            } else {
                spec.get(1..4)?
            };
            Some(Color::Rgb(
                rgb[0].min(255) as u8,
                rgb[1].min(255) as u8,
                rgb[2].min(255) as u8,
            ))
        }
        _ => None,
    }
}

/// Semicolon form: the arguments arrive as the following groups. Returns
/// the color and how many groups were consumed.
fn extended_color_groups(params: &Params, start: usize) -> Option<(Color, usize)> {
    match params.get(start)? {
        5 => params
            .get(start + 1)
            .map(|n| (Color::Indexed(n.min(255) as u8), 2)),
        2 => {
            let r = params.get(start + 1)?;
            let g = params.get(start + 2)?;
            let b = params.get(start + 3)?;
            Some((
                Color::Rgb(r.min(255) as u8, g.min(255) as u8, b.min(255) as u8),
                4,
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(groups: &[&[u16]]) -> Params {
        Params::from_groups(groups.iter().map(|g| g.to_vec()).collect())
    }

    #[test]
    fn basic_attributes_toggle() {
        let mut attrs = Attributes::default();
        apply(&mut attrs, &groups(&[&[1], &[3], &[7], &[9]]));
        assert!(attrs.flags.contains(AttrFlags::BOLD));
        assert!(attrs.flags.contains(AttrFlags::ITALIC));
        assert!(attrs.flags.contains(AttrFlags::INVERSE));
        assert!(attrs.flags.contains(AttrFlags::STRIKETHROUGH));

        apply(&mut attrs, &groups(&[&[22], &[23], &[27], &[29]]));
        assert_eq!(attrs.flags, AttrFlags::empty());
    }

    #[test]
    fn empty_list_resets() {
        let mut attrs = Attributes::default();
        attrs.fg = Color::Indexed(1);
        attrs.flags.insert(AttrFlags::BOLD);
        apply(&mut attrs, &Params::default());
        assert_eq!(attrs.fg, Color::Default);
        assert_eq!(attrs.flags, AttrFlags::empty());
    }

    #[test]
    fn named_and_bright_colors() {
        let mut attrs = Attributes::default();
        apply(&mut attrs, &groups(&[&[31], &[42]]));
        assert_eq!(attrs.fg, Color::Indexed(1));
        assert_eq!(attrs.bg, Color::Indexed(2));

        apply(&mut attrs, &groups(&[&[91], &[102]]));
        assert_eq!(attrs.fg, Color::Indexed(9));
        assert_eq!(attrs.bg, Color::Indexed(10));

        apply(&mut attrs, &groups(&[&[39], &[49]]));
        assert_eq!(attrs.fg, Color::Default);
        assert_eq!(attrs.bg, Color::Default);
    }

    #[test]
    fn extended_colors_in_both_tokenizations() {
        let mut semi = Attributes::default();
        apply(&mut semi, &groups(&[&[38], &[2], &[10], &[20], &[30]]));

        let mut colon = Attributes::default();
        apply(&mut colon, &groups(&[&[38, 2, 10, 20, 30]]));

        assert_eq!(semi.fg, Color::Rgb(10, 20, 30));
        assert_eq!(colon.fg, semi.fg);

        let mut semi = Attributes::default();
        apply(&mut semi, &groups(&[&[48], &[5], &[196]]));
        let mut colon = Attributes::default();
        apply(&mut colon, &groups(&[&[48, 5, 196]]));
        assert_eq!(semi.bg, Color::Indexed(196));
        assert_eq!(colon.bg, semi.bg);
    }

    #[test]
    fn colon_form_with_colorspace_slot() {
        let mut attrs = Attributes::default();
        apply(&mut attrs, &groups(&[&[38, 2, 0, 10, 20, 30]]));
        assert_eq!(attrs.fg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn semicolon_color_consumes_its_arguments() {
        // The 1 after the color spec is bold, not a stray parameter
        let mut attrs = Attributes::default();
        apply(&mut attrs, &groups(&[&[38], &[5], &[100], &[1]]));
        assert_eq!(attrs.fg, Color::Indexed(100));
        assert!(attrs.flags.contains(AttrFlags::BOLD));
    }

    #[test]
    fn underline_styles() {
        let mut attrs = Attributes::default();
        apply(&mut attrs, &groups(&[&[4]]));
        assert_eq!(attrs.underline, UnderlineStyle::Single);

        apply(&mut attrs, &groups(&[&[4, 3]]));
        assert_eq!(attrs.underline, UnderlineStyle::Curly);

        apply(&mut attrs, &groups(&[&[4, 0]]));
        assert_eq!(attrs.underline, UnderlineStyle::None);

        apply(&mut attrs, &groups(&[&[21]]));
        assert_eq!(attrs.underline, UnderlineStyle::Double);

        apply(&mut attrs, &groups(&[&[24]]));
        assert_eq!(attrs.underline, UnderlineStyle::None);
    }

    #[test]
    fn unknown_parameters_are_skipped() {
        let mut attrs = Attributes::default();
        apply(&mut attrs, &groups(&[&[73], &[1], &[9999]]));
        assert!(attrs.flags.contains(AttrFlags::BOLD));
    }

    #[test]
    fn reset_in_the_middle_of_a_list() {
        let mut attrs = Attributes::default();
        apply(&mut attrs, &groups(&[&[31], &[0], &[32]]));
        assert_eq!(attrs.fg, Color::Indexed(2));
        assert_eq!(attrs.flags, AttrFlags::empty());
    }
}
