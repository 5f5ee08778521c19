//! Stroke-font (CXF) loading and vectorization.
//!
//! Parses a CXF-style stroke font into straight-line glyph outlines. Arc
//! commands are flattened into line strokes at load time, so the text
//! engraver only ever deals with straight segments. Loading is
//! all-or-nothing: a font that cannot be parsed completely is never
//! returned partially populated.

use regex::Regex;
use shapekit_core::FontError;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A straight glyph segment with cached bounding extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Stroke {
    /// Creates a stroke from its two endpoints.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            xmin: x0.min(x1),
            xmax: x0.max(x1),
            ymin: y0.min(y1),
            ymax: y0.max(y1),
        }
    }
}

/// A glyph: ordered stroke list plus derived bounding box and advance.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub key: u32,
    pub strokes: Vec<Stroke>,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    /// Advance width; the maximum x extent for regular glyphs.
    pub width: f64,
    pub height: f64,
}

impl Glyph {
    /// Creates a glyph and derives its extents from the stroke list.
    pub fn new(key: u32, strokes: Vec<Stroke>) -> Self {
        let xmin = strokes.iter().map(|s| s.xmin).fold(f64::INFINITY, f64::min);
        let xmax = strokes
            .iter()
            .map(|s| s.xmax)
            .fold(f64::NEG_INFINITY, f64::max);
        let ymin = strokes.iter().map(|s| s.ymin).fold(f64::INFINITY, f64::min);
        let ymax = strokes
            .iter()
            .map(|s| s.ymax)
            .fold(f64::NEG_INFINITY, f64::max);
        let (xmin, xmax, ymin, ymax) = if strokes.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            (xmin, xmax, ymin, ymax)
        };
        Self {
            key,
            strokes,
            xmin,
            xmax,
            ymin,
            ymax,
            width: xmax,
            height: ymax - ymin,
        }
    }
}

/// A complete stroke font: glyph map plus global metrics.
///
/// Immutable once loaded; share it between text shapes with [`Arc`].
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub glyphs: BTreeMap<u32, Glyph>,
    pub name: Option<String>,
    /// Letter spacing declared by the font header.
    pub letter_spacing: Option<f64>,
    /// Word spacing declared by the font header.
    pub word_spacing: Option<f64>,
    /// Line spacing factor declared by the font header.
    pub line_spacing_factor: Option<f64>,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    /// Maximum glyph height, used to scale text to a requested box.
    pub hmax: f64,
    /// Maximum glyph width, used to scale text to a requested box.
    pub wmax: f64,
}

impl Font {
    fn new(
        glyphs: BTreeMap<u32, Glyph>,
        name: Option<String>,
        letter_spacing: Option<f64>,
        word_spacing: Option<f64>,
        line_spacing_factor: Option<f64>,
    ) -> Self {
        let xmin = glyphs.values().map(|c| c.xmin).fold(f64::INFINITY, f64::min);
        let xmax = glyphs
            .values()
            .map(|c| c.xmax)
            .fold(f64::NEG_INFINITY, f64::max);
        let ymin = glyphs.values().map(|c| c.ymin).fold(f64::INFINITY, f64::min);
        let ymax = glyphs
            .values()
            .map(|c| c.ymax)
            .fold(f64::NEG_INFINITY, f64::max);
        Self {
            name,
            letter_spacing,
            word_spacing,
            line_spacing_factor,
            xmin,
            xmax,
            ymin,
            ymax,
            hmax: ymax - ymin,
            wmax: xmax - xmin,
            glyphs,
        }
    }

    /// Whether the font defines a glyph for the given code point.
    pub fn has_glyph(&self, key: u32) -> bool {
        self.glyphs.contains_key(&key)
    }

    /// Looks up the glyph for the given code point.
    pub fn glyph(&self, key: u32) -> Option<&Glyph> {
        self.glyphs.get(&key)
    }
}

/// Shared handle to an immutable loaded font.
pub type FontHandle = Arc<Font>;

/// Resolves a glyph-block key token to a code point.
///
/// 1 character: the character itself. 2 characters: the second character.
/// 4 characters: hex code point. 5 characters with a leading marker: hex
/// of the remaining four. Anything else is rejected.
fn resolve_key(key: &str) -> Option<u32> {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        1 => Some(chars[0] as u32),
        2 => Some(chars[1] as u32),
        4 => u32::from_str_radix(key, 16).ok(),
        5 => u32::from_str_radix(&key[1..], 16).ok(),
        _ => None,
    }
}

/// Loads and parses a stroke-font file.
///
/// `arc_res` is the flattening resolution in degrees per segment.
pub fn load_font(path: impl AsRef<Path>, arc_res: f64) -> Result<Font, FontError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| FontError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_font(&text, arc_res, &path.display().to_string())
}

/// Parses stroke-font text into a [`Font`].
pub fn parse_font(text: &str, arc_res: f64, origin: &str) -> Result<Font, FontError> {
    // Header tags and glyph commands are line-oriented.
    let re_name = Regex::new(r"^#\sName:\s*(.*)").unwrap();
    let re_version = Regex::new(r"^#\sVersion:\s*(.*)").unwrap();
    let re_ws = Regex::new(r"^#\sWordSpacing:\s*(.*)").unwrap();
    let re_ls = Regex::new(r"^#\sLetterSpacing:\s*(.*)").unwrap();
    let re_lsf = Regex::new(r"^#\sLineSpacingFactor:\s*(.*)").unwrap();
    let re_cmd_v1 = Regex::new(r"^\[(.*)\]\s(\d+)").unwrap();
    let re_cmd_v2 = Regex::new(r"^\[(.*)\]\s(.*)").unwrap();
    let re_line = Regex::new(r"^L (.*)").unwrap();
    let re_arc = Regex::new(r"^(AR?) (.*)").unwrap();

    let mut glyphs: BTreeMap<u32, Glyph> = BTreeMap::new();
    let mut name: Option<String> = None;
    let mut version: Option<u32> = None;
    let mut ws: Option<f64> = None;
    let mut ls: Option<f64> = None;
    let mut lsf: Option<f64> = None;
    let mut key: Option<u32> = None;
    let mut strokes: Vec<Stroke> = Vec::new();
    // Maximum x coordinate seen anywhere; the space-advance fallback.
    let mut xmax_seen: f64 = 0.0;

    for (lineno, line) in text.lines().enumerate() {
        if name.is_none() {
            if let Some(m) = re_name.captures(line) {
                name = Some(m[1].to_string());
            }
        }
        if version.is_none() {
            if let Some(m) = re_version.captures(line) {
                // Version detection is keyed off the header text length:
                // the long 2.0.x version strings differ from the short
                // 1.x/2.x ones.
                version = Some(if m[1].len() < 6 { 1 } else { 2 });
            }
        }
        if ws.is_none() {
            if let Some(m) = re_ws.captures(line) {
                ws = m[1].trim().parse().ok();
            }
        }
        if ls.is_none() {
            if let Some(m) = re_ls.captures(line) {
                ls = m[1].trim().parse().ok();
            }
        }
        if lsf.is_none() {
            if let Some(m) = re_lsf.captures(line) {
                lsf = m[1].trim().parse().ok();
            }
        }

        if line.is_empty() {
            // A blank line completes the current glyph block. First
            // definition of a key wins.
            if let Some(k) = key.take() {
                glyphs
                    .entry(k)
                    .or_insert_with(|| Glyph::new(k, std::mem::take(&mut strokes)));
                strokes.clear();
            }
        }

        let new_cmd = match version {
            Some(1) => re_cmd_v1.captures(line).map(|m| m[1].to_string()),
            Some(2) => re_cmd_v2.captures(line).map(|m| m[2].to_string()),
            _ => None,
        };
        if let Some(token) = new_cmd {
            key = resolve_key(&token);
            if key.is_none() {
                debug!("Glyph key {token:?} not recognized, block skipped");
            }
            strokes.clear();
        }

        if let Some(m) = re_line.captures(line) {
            let coords = parse_coords(&m[1], 4, lineno + 1, line)?;
            xmax_seen = xmax_seen.max(coords[0]).max(coords[2]);
            strokes.push(Stroke::new(coords[0], coords[1], coords[2], coords[3]));
        }

        if let Some(m) = re_arc.captures(line) {
            let ccw = &m[1] == "A";
            let coords = parse_coords(&m[2], 5, lineno + 1, line)?;
            let (xc, yc, radius, start, end) = (coords[0], coords[1], coords[2], coords[3], coords[4]);
            // Sweep honors the 0/360 wraparound per direction.
            let degs = if ccw {
                if start > end {
                    360.0 + end - start
                } else {
                    end - start
                }
            } else if start > end {
                start - end
            } else {
                360.0 - end + start
            };
            let segs = (degs / arc_res) as i64 + 1;
            let incr = degs / segs as f64;
            let mut angle = start;
            let mut xs = (start.to_radians()).cos() * radius + xc;
            let mut ys = (start.to_radians()).sin() * radius + yc;
            xmax_seen = xmax_seen.max(xs);
            for _ in 0..segs {
                if ccw {
                    angle += incr;
                } else {
                    angle -= incr;
                }
                let xe = (angle.to_radians()).cos() * radius + xc;
                let ye = (angle.to_radians()).sin() * radius + yc;
                strokes.push(Stroke::new(xs, ys, xe, ye));
                xmax_seen = xmax_seen.max(xe);
                xs = xe;
                ys = ye;
            }
        }
    }

    if version.is_none() {
        return Err(FontError::MissingVersion {
            path: origin.to_string(),
        });
    }

    // Synthesize the blank space glyph: its advance is the declared word
    // spacing, or the widest x extent observed when the header omitted it.
    let space_width = ws.filter(|&v| v != 0.0).unwrap_or(xmax_seen);
    let mut space = Glyph::new(' ' as u32, Vec::new());
    space.width = space_width;
    space.xmax = space_width;
    glyphs.insert(' ' as u32, space);

    debug!(
        "Font {:?} parsed, {} glyphs",
        name.as_deref().unwrap_or("unnamed"),
        glyphs.len()
    );
    Ok(Font::new(glyphs, name, ls, ws, lsf))
}

fn parse_coords(
    text: &str,
    expect: usize,
    line: usize,
    raw: &str,
) -> Result<Vec<f64>, FontError> {
    let vals: Result<Vec<f64>, _> = text.split(',').map(|n| n.trim().parse::<f64>()).collect();
    match vals {
        Ok(v) if v.len() == expect => Ok(v),
        _ => Err(FontError::MalformedCoordinates {
            line,
            text: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# Name: testfont\n\
# Version: 1\n\
# LetterSpacing: 3.0\n\
# WordSpacing: 6.75\n\
# LineSpacingFactor: 1.0\n\
\n\
[A] 1\n\
L 0,0,2,6\n\
L 2,6,4,0\n\
L 1,3,3,3\n\
\n\
[B] 2\n\
L 0,0,0,6\n\
A 1,3,2,270,90\n\
\n";

    #[test]
    fn test_parse_header_metrics() {
        let font = parse_font(SAMPLE, 10.0, "test").unwrap();
        assert_eq!(font.name.as_deref(), Some("testfont"));
        assert_eq!(font.letter_spacing, Some(3.0));
        assert_eq!(font.word_spacing, Some(6.75));
        assert_eq!(font.line_spacing_factor, Some(1.0));
        assert!(font.has_glyph('A' as u32));
        assert!(font.has_glyph('B' as u32));
    }

    #[test]
    fn test_glyph_extents() {
        let font = parse_font(SAMPLE, 10.0, "test").unwrap();
        let a = font.glyph('A' as u32).unwrap();
        assert_eq!(a.strokes.len(), 3);
        assert_eq!(a.xmin, 0.0);
        assert_eq!(a.xmax, 4.0);
        assert_eq!(a.ymax, 6.0);
        assert_eq!(a.width, 4.0);
    }

    #[test]
    fn test_arc_flattening_segment_count() {
        // A 90 degree CCW arc at 10 degree resolution flattens into
        // floor(90/10)+1 = 10 strokes.
        let text = "\
# Version: 1\n\
\n\
[C] 1\n\
A 0,0,5,0,90\n\
\n";
        let font = parse_font(text, 10.0, "test").unwrap();
        let c = font.glyph('C' as u32).unwrap();
        assert_eq!(c.strokes.len(), 10);
        // Strokes chain: first starts at angle 0, last ends at angle 90.
        let first = c.strokes.first().unwrap();
        let last = c.strokes.last().unwrap();
        assert!((first.x0 - 5.0).abs() < 1e-9);
        assert!(first.y0.abs() < 1e-9);
        assert!(last.x1.abs() < 1e-9);
        assert!((last.y1 - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_cw_arc_wraparound_sweep() {
        // AR from 90 to 270 sweeps 360-270+90 = 180 degrees clockwise.
        let text = "\
# Version: 1\n\
\n\
[D] 1\n\
AR 0,0,5,90,270\n\
\n";
        let font = parse_font(text, 45.0, "test").unwrap();
        let d = font.glyph('D' as u32).unwrap();
        assert_eq!(d.strokes.len(), 5); // floor(180/45)+1
        let last = d.strokes.last().unwrap();
        // Clockwise from 90 through 0 down to -90 (=270).
        assert!(last.x1.abs() < 1e-9);
        assert!((last.y1 + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_space_glyph_from_word_spacing() {
        let font = parse_font(SAMPLE, 10.0, "test").unwrap();
        let space = font.glyph(' ' as u32).unwrap();
        assert_eq!(space.width, 6.75);
        assert!(space.strokes.is_empty());
    }

    #[test]
    fn test_space_glyph_falls_back_to_observed_extent() {
        let text = "\
# Version: 1\n\
\n\
[A] 1\n\
L 0,0,4,0\n\
\n";
        let font = parse_font(text, 10.0, "test").unwrap();
        assert_eq!(font.glyph(' ' as u32).unwrap().width, 4.0);
    }

    #[test]
    fn test_unrecognized_keys_skip_glyph_not_load() {
        let text = "\
# Version: 1\n\
\n\
[toolong] 1\n\
L 0,0,1,1\n\
\n\
[A] 2\n\
L 0,0,2,2\n\
\n";
        let font = parse_font(text, 10.0, "test").unwrap();
        assert!(font.has_glyph('A' as u32));
        // Skipped glyph plus the synthetic space.
        assert_eq!(font.glyphs.len(), 2);
    }

    #[test]
    fn test_version2_key_from_trailing_token() {
        let text = "\
# Version: 2.0.1.3\n\
\n\
[65] 0041\n\
L 0,0,1,1\n\
\n";
        let font = parse_font(text, 10.0, "test").unwrap();
        assert!(font.has_glyph(0x41));
    }

    #[test]
    fn test_missing_version_is_load_error() {
        let err = parse_font("# Name: x\n\n[A] 1\nL 0,0,1,1\n\n", 10.0, "test").unwrap_err();
        assert!(matches!(err, FontError::MissingVersion { .. }));
    }

    #[test]
    fn test_malformed_coordinates_fail_whole_load() {
        let text = "\
# Version: 1\n\
\n\
[A] 1\n\
L 0,0,zzz,1\n\
\n";
        let err = parse_font(text, 10.0, "test").unwrap_err();
        assert!(matches!(err, FontError::MalformedCoordinates { .. }));
    }

    #[test]
    fn test_load_font_missing_file() {
        let err = load_font("/nonexistent/font.cxf", 10.0).unwrap_err();
        assert!(matches!(err, FontError::Io { .. }));
    }

    #[test]
    fn test_load_font_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let font = load_font(file.path(), 10.0).unwrap();
        assert!(font.has_glyph('A' as u32));
    }

    #[test]
    fn test_first_definition_of_key_wins() {
        let text = "\
# Version: 1\n\
\n\
[A] 1\n\
L 0,0,1,1\n\
\n\
[A] 2\n\
L 0,0,9,9\n\
\n";
        let font = parse_font(text, 10.0, "test").unwrap();
        assert_eq!(font.glyph('A' as u32).unwrap().xmax, 1.0);
    }
}
