//! The tag palette: the fixed set of tags offered for dragging, and their colours.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ConfigError;

/// Colour families a tag can be drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteColour {
    Red,
    Green,
    Purple,
    Blue,
    Orange,
    Pink,
    Sky,
    Emerald,
    Amber,
    Indigo,
}

impl FromStr for PaletteColour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(PaletteColour::Red),
            "green" => Ok(PaletteColour::Green),
            "purple" => Ok(PaletteColour::Purple),
            "blue" => Ok(PaletteColour::Blue),
            "orange" => Ok(PaletteColour::Orange),
            "pink" => Ok(PaletteColour::Pink),
            "sky" => Ok(PaletteColour::Sky),
            "emerald" => Ok(PaletteColour::Emerald),
            "amber" => Ok(PaletteColour::Amber),
            "indigo" => Ok(PaletteColour::Indigo),
            other => Err(other.to_string()),
        }
    }
}

const BUILTIN: &[(&str, PaletteColour)] = &[
    ("Bug", PaletteColour::Red),
    ("Feature", PaletteColour::Green),
    ("Refactor", PaletteColour::Purple),
    ("Docs", PaletteColour::Blue),
    ("DevOps", PaletteColour::Orange),
    ("Design", PaletteColour::Pink),
    ("Backend", PaletteColour::Sky),
    ("Frontend", PaletteColour::Emerald),
    ("Urgente", PaletteColour::Amber),
    ("Melhoria", PaletteColour::Sky),
    ("Integração", PaletteColour::Indigo),
];

/// Ordered tag list plus colour lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TagPalette {
    tags: Vec<(String, PaletteColour)>,
}

impl Default for TagPalette {
    fn default() -> Self {
        TagPalette {
            tags: BUILTIN.iter().map(|(t, c)| (t.to_string(), *c)).collect(),
        }
    }
}

impl TagPalette {
    /// Apply colour overrides from configuration. Unknown tags are added to
    /// the end of the palette; known tags keep their position.
    pub fn with_overrides(mut self, colours: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut names: Vec<&String> = colours.keys().collect();
        names.sort();
        for tag in names {
            let colour = colours[tag]
                .parse::<PaletteColour>()
                .map_err(|colour| ConfigError::UnknownColour {
                    tag: tag.clone(),
                    colour,
                })?;
            match self.tags.iter_mut().find(|(t, _)| t == tag) {
                Some(entry) => entry.1 = colour,
                None => self.tags.push((tag.clone(), colour)),
            }
        }
        Ok(self)
    }

    /// Tags in palette order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tags.get(index).map(|(t, _)| t.as_str())
    }

    /// Colour for `tag`, or `None` for tags outside the palette.
    pub fn colour_of(&self, tag: &str) -> Option<PaletteColour> {
        self.tags.iter().find(|(t, _)| t == tag).map(|(_, c)| *c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_palette() {
        let palette = TagPalette::default();
        assert_eq!(palette.len(), 11);
        assert_eq!(palette.get(0), Some("Bug"));
        assert_eq!(palette.colour_of("Urgente"), Some(PaletteColour::Amber));
        assert_eq!(palette.colour_of("QA"), None);
    }

    #[test]
    fn test_overrides() {
        let mut colours = HashMap::new();
        colours.insert("Bug".to_string(), "Pink".to_string());
        colours.insert("QA".to_string(), "indigo".to_string());
        let palette = TagPalette::default().with_overrides(&colours).unwrap();
        assert_eq!(palette.get(0), Some("Bug"));
        assert_eq!(palette.colour_of("Bug"), Some(PaletteColour::Pink));
        assert_eq!(palette.tags().last(), Some("QA"));
        assert_eq!(palette.colour_of("QA"), Some(PaletteColour::Indigo));
    }

    #[test]
    fn test_unknown_colour_rejected() {
        let mut colours = HashMap::new();
        colours.insert("Bug".to_string(), "mauve".to_string());
        let err = TagPalette::default().with_overrides(&colours).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownColour { ref tag, ref colour } if tag == "Bug" && colour == "mauve"));
    }
}
