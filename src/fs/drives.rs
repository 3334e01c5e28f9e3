/// Source of top-level drive roots for the selector's drive button.
///
/// Platforms without drive letters use [`NoDrives`], which hides the button.
pub trait DriveSource {
    /// Root paths of the available drives, in display order.
    fn drives(&self) -> Vec<String>;
}

/// Drive source for single-rooted filesystems.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDrives;

impl DriveSource for NoDrives {
    fn drives(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Drive source for the platform this binary runs on.
pub fn platform_drives() -> Box<dyn DriveSource> {
    Box::new(NoDrives)
}

/// The drive after `current` in `drives`, wrapping around.
///
/// Falls back to the first drive when `current` is not one of them.
pub fn next_drive<'a>(drives: &'a [String], current: &str) -> Option<&'a str> {
    if drives.is_empty() {
        return None;
    }
    let next = drives
        .iter()
        .position(|d| current.starts_with(d.as_str()))
        .map_or(0, |i| (i + 1) % drives.len());
    Some(drives[next].as_str())
}
