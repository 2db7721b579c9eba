//! Family/style naming and the style bits that must agree with it.

use anyhow::Result;
use charon_font_ops::{NamePlatform, NameRecords, optional_table, rewrite_font_if, update_names};
use log::debug;
use read_fonts::TableProvider;
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        head::{Head, MacStyle},
        os2::{Os2, SelectionFlags},
    },
};

use crate::{
    FontContext,
    targets::{FAMILY, FAMILY_MONO},
};

const NAME_ID_FAMILY: u16 = 1;
const NAME_ID_SUBFAMILY: u16 = 2;
const NAME_ID_FULL_NAME: u16 = 4;
const NAME_ID_POSTSCRIPT_NAME: u16 = 6;
const NAME_ID_TYPOGRAPHIC_FAMILY: u16 = 16;
const NAME_ID_TYPOGRAPHIC_SUBFAMILY: u16 = 17;

/// The weights Iosevka Charon ships in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weight {
    Thin,
    ExtraLight,
    Light,
    Regular,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Heavy,
}

impl Weight {
    /// File name tokens, longest first so `SemiBold` is never read as `Bold`.
    const FILE_TOKENS: [(&'static str, Weight); 9] = [
        ("ExtraLight", Weight::ExtraLight),
        ("ExtraBold", Weight::ExtraBold),
        ("SemiBold", Weight::SemiBold),
        ("Medium", Weight::Medium),
        ("Heavy", Weight::Heavy),
        ("Black", Weight::Heavy),
        ("Light", Weight::Light),
        ("Bold", Weight::Bold),
        ("Thin", Weight::Thin),
    ];

    pub fn from_class(class: u16) -> Option<Self> {
        Some(match class {
            100 => Self::Thin,
            200 => Self::ExtraLight,
            300 => Self::Light,
            400 => Self::Regular,
            500 => Self::Medium,
            600 => Self::SemiBold,
            700 => Self::Bold,
            800 => Self::ExtraBold,
            900 => Self::Heavy,
            _ => return None,
        })
    }

    /// The weight named in a file stem, if any.
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        Self::FILE_TOKENS
            .iter()
            .find(|(token, _)| stem.contains(token))
            .map(|&(_, weight)| weight)
    }

    /// OS/2 `usWeightClass`.
    pub fn class(self) -> u16 {
        match self {
            Self::Thin => 100,
            Self::ExtraLight => 200,
            Self::Light => 300,
            Self::Regular => 400,
            Self::Medium => 500,
            Self::SemiBold => 600,
            Self::Bold => 700,
            Self::ExtraBold => 800,
            Self::Heavy => 900,
        }
    }

    /// Style name as Google Fonts spells it.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Thin => "Thin",
            Self::ExtraLight => "Extralight",
            Self::Light => "Light",
            Self::Regular => "Regular",
            Self::Medium => "Medium",
            Self::SemiBold => "Semibold",
            Self::Bold => "Bold",
            Self::ExtraBold => "Extrabold",
            Self::Heavy => "Heavy",
        }
    }
}

/// Name table strings for one style.
///
/// Regular, Italic, Bold and Bold Italic (RIBBI) styles live in the base
/// family. Every other weight gets its own legacy family, with the shared
/// family carried in the typographic names (IDs 16 and 17).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleNames {
    pub family: String,
    pub subfamily: String,
    pub full_name: String,
    pub postscript_name: String,
    /// Typographic family and subfamily, for non-RIBBI styles only.
    pub typographic: Option<(String, String)>,
}

impl StyleNames {
    pub fn resolve(base_family: &str, weight: Weight, italic: bool) -> Self {
        let ribbi = match (weight, italic) {
            (Weight::Regular, false) => Some(("Regular", "Regular")),
            (Weight::Bold, false) => Some(("Bold", "Bold")),
            (Weight::Regular, true) => Some(("Italic", "Italic")),
            (Weight::Bold, true) => Some(("Bold Italic", "BoldItalic")),
            _ => None,
        };

        let (family, subfamily, suffix, typographic) = match ribbi {
            Some((subfamily, suffix)) => {
                (base_family.to_string(), subfamily.to_string(), suffix.to_string(), None)
            }
            None => {
                let weight = weight.display_name();
                let (subfamily, suffix, typographic_subfamily) = if italic {
                    ("Italic", format!("{weight}Italic"), format!("{weight} Italic"))
                } else {
                    ("Regular", weight.to_string(), weight.to_string())
                };
                (
                    format!("{base_family} {weight}"),
                    subfamily.to_string(),
                    suffix,
                    Some((base_family.to_string(), typographic_subfamily)),
                )
            }
        };

        // upright non-RIBBI full names drop the "Regular"
        let full_name = if typographic.is_some() && !italic {
            family.clone()
        } else {
            format!("{family} {subfamily}")
        };
        let postscript_name = format!("{}-{suffix}", base_family.replace(' ', ""));

        Self { family, subfamily, full_name, postscript_name, typographic }
    }
}

/// Family and style names from the file name and italic bits, and the matching
/// `usWeightClass`.
pub fn fix_font_names(data: &[u8], ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_font_if(data, |font, builder| {
        let head: Option<Head> = optional_table(font.head())?.map(|t| t.to_owned_table());
        let os2: Option<Os2> = optional_table(font.os2())?.map(|t| t.to_owned_table());

        let italic = head.as_ref().is_some_and(|h| h.mac_style.contains(MacStyle::ITALIC))
            || os2.as_ref().is_some_and(|o| o.fs_selection.contains(SelectionFlags::ITALIC));
        let weight = Weight::from_file_stem(ctx.file_stem())
            .or_else(|| os2.as_ref().and_then(|o| Weight::from_class(o.us_weight_class)))
            .unwrap_or(Weight::Regular);

        let mut changed = false;
        if let Some(original) = os2 {
            let mut os2 = original.clone();
            os2.us_weight_class = weight.class();
            if os2 != original {
                builder.add_table(&os2)?;
                changed = true;
            }
        }

        changed |= update_names(font, builder, |names| {
            let family_hint = names.get(NAME_ID_FAMILY, NamePlatform::WINDOWS_ENGLISH).unwrap_or("");
            let mono = family_hint.contains("Mono") || ctx.file_name.contains("Mono");
            let base_family = if mono { FAMILY_MONO } else { FAMILY };
            let style = StyleNames::resolve(base_family, weight, italic);
            debug!("{}: {} ({})", ctx.file_name, style.full_name, style.postscript_name);

            for platform in NamePlatform::ALL {
                names.set(NAME_ID_FAMILY, platform, &style.family);
                names.set(NAME_ID_SUBFAMILY, platform, &style.subfamily);
                names.set(NAME_ID_FULL_NAME, platform, &style.full_name);
                names.set(NAME_ID_POSTSCRIPT_NAME, platform, &style.postscript_name);
            }
            match &style.typographic {
                Some((family, subfamily)) => {
                    names.set_all(NAME_ID_TYPOGRAPHIC_FAMILY, family);
                    names.set_all(NAME_ID_TYPOGRAPHIC_SUBFAMILY, subfamily);
                }
                None => {
                    names.remove_where(|name_id, _| {
                        matches!(name_id, NAME_ID_TYPOGRAPHIC_FAMILY | NAME_ID_TYPOGRAPHIC_SUBFAMILY)
                    });
                }
            }
            Ok(())
        })?;

        Ok(changed)
    })
}

/// `fsSelection` italic/bold/regular bits and `head.macStyle` from the
/// subfamily name.
pub fn fix_style_bits(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_font_if(data, |font, builder| {
        let names = NameRecords::from_font(font)?;
        let subfamily = names.get(NAME_ID_SUBFAMILY, NamePlatform::WINDOWS_ENGLISH).unwrap_or("");
        let italic = subfamily.contains("Italic");
        let bold = subfamily.replace(" Italic", "").trim() == "Bold";
        let regular = !bold && !italic;

        let mut changed = false;
        if let Some(os2) = optional_table(font.os2())? {
            let original: Os2 = os2.to_owned_table();
            let mut os2 = original.clone();
            os2.fs_selection
                .remove(SelectionFlags::ITALIC | SelectionFlags::BOLD | SelectionFlags::REGULAR);
            for (flag, set) in [
                (SelectionFlags::ITALIC, italic),
                (SelectionFlags::BOLD, bold),
                (SelectionFlags::REGULAR, regular),
            ] {
                if set {
                    os2.fs_selection.insert(flag);
                }
            }
            if os2 != original {
                builder.add_table(&os2)?;
                changed = true;
            }
        }

        if let Some(head) = optional_table(font.head())? {
            let original: Head = head.to_owned_table();
            let mut head = original.clone();
            head.mac_style = MacStyle::empty();
            if bold {
                head.mac_style.insert(MacStyle::BOLD);
            }
            if italic {
                head.mac_style.insert(MacStyle::ITALIC);
            }
            if head != original {
                builder.add_table(&head)?;
                changed = true;
            }
        }

        Ok(changed)
    })
}
