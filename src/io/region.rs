//! Region persistence and polygon input files
//!
//! A region is stored as three files sharing one base path:
//! - `<path>`: the text record below
//! - `<path>.png`: the RGBA selection patch
//! - `<path>b.png`: the binary mask preview
//!
//! ```text
//! <borderCount>
//! <x> <y>            (borderCount lines)
//! <areaCount>
//! <x> <y>            (areaCount lines)
//! <xMin> <yMin> <xMax> <yMax>
//! ```

use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::io::configuration::{REGION_MASK_SUFFIX, REGION_PATCH_SUFFIX};
use crate::io::error::{BlendError, Result, parse_error};
use crate::io::image::{load_rgba, mask_preview, save_gray, save_rgba};
use crate::spatial::coordinate::{BoundingBox, Coordinate};
use crate::spatial::mask::Selection;

/// A stored selection together with its source patch
#[derive(Debug, Clone)]
pub struct Region {
    /// Border, area and bounding box
    pub selection: Selection,
    /// RGBA patch anchored at the bounding-box origin
    pub patch: RgbaImage,
}

/// Path of the RGBA patch stored beside `path`
pub fn patch_path(path: &Path) -> PathBuf {
    with_suffix(path, REGION_PATCH_SUFFIX)
}

/// Path of the mask preview stored beside `path`
pub fn mask_path(path: &Path) -> PathBuf {
    with_suffix(path, REGION_MASK_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Render a selection in the text record format
pub fn format_selection(selection: &Selection) -> String {
    let mut text = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(text, "{}", selection.border.len());
    for point in &selection.border {
        let _ = writeln!(text, "{} {}", point.x, point.y);
    }
    let _ = writeln!(text, "{}", selection.area.len());
    for point in &selection.area {
        let _ = writeln!(text, "{} {}", point.x, point.y);
    }
    let bounds = selection.bounds;
    let _ = writeln!(
        text,
        "{} {} {} {}",
        bounds.x_min, bounds.y_min, bounds.x_max, bounds.y_max
    );
    text
}

/// Parse the text record format
///
/// Tokens are whitespace separated; line breaks carry no meaning beyond error
/// reporting. `path` only labels errors.
///
/// # Errors
///
/// Returns a parse error if:
/// - A token is not an integer, or a count is negative
/// - The record ends early or has trailing tokens
/// - The bounding box is inverted, too large, or does not enclose the border
///   exactly
pub fn parse_selection(text: &str, path: &Path) -> Result<Selection> {
    let mut tokens = Tokens::new(text, path);

    let border = tokens.coordinates("border")?;
    let area = tokens.coordinates("area")?;
    let bounds = BoundingBox {
        x_min: tokens.integer("bounding box")?,
        y_min: tokens.integer("bounding box")?,
        x_max: tokens.integer("bounding box")?,
        y_max: tokens.integer("bounding box")?,
    };
    tokens.finish()?;

    if bounds.x_min > bounds.x_max || bounds.y_min > bounds.y_max {
        return Err(parse_error(
            path,
            None,
            &format!("inverted bounding box {bounds:?}"),
        ));
    }
    if !bounds.is_addressable() {
        return Err(parse_error(
            path,
            None,
            &format!("bounding box {bounds:?} is too large"),
        ));
    }
    if BoundingBox::enclosing(&border) != Some(bounds) {
        return Err(parse_error(
            path,
            None,
            &"bounding box does not match the border",
        ));
    }

    Ok(Selection {
        border,
        area,
        bounds,
    })
}

/// Save a region: text record, patch and mask preview
///
/// # Errors
///
/// Returns an error if any of the three files cannot be written
pub fn save_region(path: &Path, selection: &Selection, patch: &RgbaImage) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BlendError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }
    std::fs::write(path, format_selection(selection)).map_err(|e| BlendError::FileSystem {
        path: path.to_path_buf(),
        operation: "write region",
        source: e,
    })?;
    save_rgba(patch, &patch_path(path))?;
    save_gray(&mask_preview(patch), &mask_path(path))?;

    log::info!(
        "region saved to {} ({} border points, {} interior pixels)",
        path.display(),
        selection.border.len(),
        selection.area.len()
    );
    Ok(())
}

/// Load a region and its patch
///
/// # Errors
///
/// Returns an error if:
/// - The record or patch cannot be read
/// - The record is malformed
/// - The patch does not cover the bounding box
pub fn load_region(path: &Path) -> Result<Region> {
    let text = read_text(path, "read region")?;
    let selection = parse_selection(&text, path)?;

    let patch_file = patch_path(path);
    let patch = load_rgba(&patch_file)?;
    if patch.width() < selection.bounds.width() || patch.height() < selection.bounds.height() {
        return Err(parse_error(
            &patch_file,
            None,
            &format!(
                "patch is {}x{} but the bounding box spans {}x{}",
                patch.width(),
                patch.height(),
                selection.bounds.width(),
                selection.bounds.height()
            ),
        ));
    }

    log::info!(
        "region loaded from {} ({} interior pixels)",
        path.display(),
        selection.area.len()
    );
    Ok(Region { selection, patch })
}

/// Read polygon vertices, one `x y` pair per line
///
/// Blank lines and text after `#` are ignored.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not two integers
pub fn load_polygon(path: &Path) -> Result<Vec<Coordinate>> {
    let text = read_text(path, "read polygon")?;
    parse_polygon(&text, path)
}

/// Parse polygon vertices from text; `path` only labels errors
///
/// # Errors
///
/// Returns a parse error if a line is not exactly two integers
pub fn parse_polygon(text: &str, path: &Path) -> Result<Vec<Coordinate>> {
    let mut vertices = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let fields: Vec<&str> = content.split_whitespace().collect();
        let &[x, y] = fields.as_slice() else {
            return Err(parse_error(
                path,
                Some(number + 1),
                &format!("expected `x y`, found {} fields", fields.len()),
            ));
        };
        let parse = |field: &str| {
            field
                .parse::<i32>()
                .map_err(|e| parse_error(path, Some(number + 1), &format!("'{field}': {e}")))
        };
        vertices.push(Coordinate::new(parse(x)?, parse(y)?));
    }
    Ok(vertices)
}

fn read_text(path: &Path, operation: &'static str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| BlendError::FileSystem {
        path: path.to_path_buf(),
        operation,
        source: e,
    })
}

// Whitespace tokenizer that remembers the line of every token
struct Tokens<'a> {
    path: &'a Path,
    inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str, path: &'a Path) -> Self {
        let inner = text
            .lines()
            .enumerate()
            .flat_map(|(number, line)| line.split_whitespace().map(move |t| (number + 1, t)));
        Self {
            path,
            inner: Box::new(inner),
            last_line: 0,
        }
    }

    fn integer(&mut self, what: &str) -> Result<i32> {
        let Some((line, token)) = self.inner.next() else {
            return Err(parse_error(
                self.path,
                None,
                &format!("unexpected end of file while reading {what}"),
            ));
        };
        self.last_line = line;
        token.parse::<i32>().map_err(|e| {
            parse_error(self.path, Some(line), &format!("{what}: '{token}': {e}"))
        })
    }

    fn count(&mut self, what: &str) -> Result<usize> {
        let value = self.integer(what)?;
        usize::try_from(value).map_err(|e| {
            parse_error(
                self.path,
                Some(self.last_line),
                &format!("{what} count {value} is invalid: {e}"),
            )
        })
    }

    fn coordinates(&mut self, what: &str) -> Result<Vec<Coordinate>> {
        let count = self.count(what)?;
        let mut points = Vec::new();
        for _ in 0..count {
            let x = self.integer(what)?;
            let y = self.integer(what)?;
            points.push(Coordinate::new(x, y));
        }
        Ok(points)
    }

    fn finish(mut self) -> Result<()> {
        match self.inner.next() {
            None => Ok(()),
            Some((line, token)) => Err(parse_error(
                self.path,
                Some(line),
                &format!("unexpected trailing token '{token}'"),
            )),
        }
    }
}
