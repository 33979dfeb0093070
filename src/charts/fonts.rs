//! Label font registration for the bitmap backend.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use forecast_core::CoreError;
use plotters::style::{register_font, FontStyle};

/// Family name every chart asks plotters for.
pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Registers a label font once per process.
///
/// The first successful registration wins; after a failure later calls try
/// again, so a configured `font_path` can still rescue the run.
pub fn ensure_font(preferred: Option<&Path>) -> Result<PathBuf, CoreError> {
    let mut registered = REGISTERED
        .lock()
        .map_err(|_| CoreError::Export("font registry lock poisoned".into()))?;
    if let Some(path) = registered.as_ref() {
        return Ok(path.clone());
    }
    let path = register_first(candidates(preferred)).map_err(CoreError::Export)?;
    *registered = Some(path.clone());
    Ok(path)
}

fn candidates(preferred: Option<&Path>) -> Vec<PathBuf> {
    preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
        .collect()
}

fn register_first(candidates: Vec<PathBuf>) -> Result<PathBuf, String> {
    let tried = candidates.len();
    for path in candidates {
        let Ok(bytes) = fs::read(&path) else {
            continue;
        };
        // plotters keeps registered font data for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                let _ = register_font(FONT_FAMILY, FontStyle::Bold, bytes);
                tracing::debug!(font = %path.display(), "chart font registered");
                return Ok(path);
            }
            Err(_) => {
                tracing::warn!(font = %path.display(), "unreadable font file skipped");
            }
        }
    }
    Err(format!(
        "no usable font among {} candidate(s); set charts.font_path in the configuration",
        tried
    ))
}
