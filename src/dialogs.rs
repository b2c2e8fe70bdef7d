// Native dialogs
// File chooser for the background image and the modal error box

use log::debug;
use std::path::PathBuf;

/// Blocking user dialogs the window needs
pub trait Dialogs {
    /// Ask the user for a background image. `None` when cancelled.
    fn pick_image(&mut self) -> Option<PathBuf>;

    /// Show a modal error message and wait for it to be dismissed
    fn show_error(&mut self, title: &str, message: &str);
}

/// Dialogs backed by the platform's native file chooser and message box
#[derive(Debug, Default)]
pub struct NativeDialogs;

impl Dialogs for NativeDialogs {
    fn pick_image(&mut self) -> Option<PathBuf> {
        let picked = rfd::FileDialog::new()
            .set_title("Choose background image...")
            .set_file_name("Image.jpg")
            .add_filter(
                "Common Image Files",
                &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "ico", "tga", "qoi"],
            )
            .add_filter("All Files", &["*"])
            .pick_file();
        debug!("File chooser returned {:?}", picked);
        picked
    }

    fn show_error(&mut self, title: &str, message: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}
