//! Native platform helpers (clipboard, files).

use std::path::Path;

/// Copy text to the system clipboard. Returns false when no clipboard is
/// reachable.
#[cfg(feature = "native")]
pub fn copy_text_to_clipboard(text: &str) -> bool {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text.to_string()) {
            Ok(()) => {
                log::info!("Copied {} bytes to clipboard", text.len());
                true
            }
            Err(e) => {
                log::error!("Failed to copy to clipboard: {}", e);
                false
            }
        },
        Err(e) => {
            log::error!("Failed to access clipboard: {}", e);
            false
        }
    }
}

#[cfg(not(feature = "native"))]
pub fn copy_text_to_clipboard(_text: &str) -> bool {
    false
}

/// Write exported PNG bytes.
pub fn write_png(path: &Path, png_data: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, png_data)?;
    log::info!("Exported PNG to: {:?}", path);
    Ok(())
}
