//! The editing session: one source image, one transform state, one mode.
//!
//! All mutation happens in response to discrete caller actions, one at a
//! time; the session is single-threaded and cooperative. The only suspension
//! points are the async entry points that decode bytes ([`EditSession::open`],
//! [`EditSession::replace_source`]) and the export encode
//! ([`EditSession::export`]); the caller awaits them before the next state
//! transition is applied.

use tracing::debug;

use easel_core::{crop_to_natural, Bitmap, CropRegion, TransformState};

use crate::config::SessionConfig;
use crate::decode_source;
use crate::error::{ExportError, SessionError};
use crate::export::{build_record, ExportRecord};
use crate::handle::{DisplayHandle, HandleStore};
use crate::metadata::SessionMetadata;
use crate::surface::RenderSurface;

/// What the session is doing right now. Exactly one mode is active at a
/// time; the crop selection lives inside the `Cropping` variant so a
/// selection cannot exist outside crop mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Normal display; transform controls and file replacement are enabled.
    Viewing,
    /// A crop selection overlays the untransformed natural image; main
    /// surface rendering is suspended and transform controls are disabled.
    Cropping {
        /// The current selection, last-write-wins.
        region: CropRegion,
    },
    /// An export is encoding; every other action is rejected.
    Uploading,
    /// A successful export ended the session; terminal.
    Saved,
}

impl Mode {
    /// Short lowercase name used in guard errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Viewing => "viewing",
            Mode::Cropping { .. } => "cropping",
            Mode::Uploading => "uploading",
            Mode::Saved => "saved",
        }
    }

    pub fn is_viewing(&self) -> bool {
        matches!(self, Mode::Viewing)
    }

    pub fn is_cropping(&self) -> bool {
        matches!(self, Mode::Cropping { .. })
    }
}

/// How a crop session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    /// The selection was applied; the source image was replaced.
    Committed,
    /// The selection was discarded; nothing changed.
    Cancelled,
}

/// A single-image editing session.
///
/// Owns the decoded source bitmap, the transform state, the render surface
/// and the display handle for the bitmap on screen. Dropping the session
/// releases the handle on every exit path.
#[derive(Debug)]
pub struct EditSession {
    source: Bitmap,
    transform: TransformState,
    surface: Option<RenderSurface>,
    mode: Mode,
    metadata: SessionMetadata,
    config: SessionConfig,
    /// Dimensions at which the caller currently displays the image; `None`
    /// means native size (scale 1).
    display: Option<(u32, u32)>,
    handles: HandleStore,
    display_handle: Option<DisplayHandle>,
}

impl EditSession {
    /// Open a session from raw file bytes and a declared mime type.
    ///
    /// Decoding is the suspension point; on failure no session is created.
    /// The default title derives from the filename.
    pub async fn open(
        bytes: &[u8],
        mime_type: &str,
        filename: &str,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let source = decode_source(bytes, mime_type).await?;
        debug!(
            width = source.width,
            height = source.height,
            filename,
            "session opened"
        );

        let surface = RenderSurface::new(&source);
        let handles = HandleStore::new();
        let display_handle = handles.acquire();

        Ok(Self {
            source,
            transform: TransformState::default(),
            surface: Some(surface),
            mode: Mode::Viewing,
            metadata: SessionMetadata::from_filename(filename),
            config,
            display: None,
            handles,
            display_handle: Some(display_handle),
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// The natural (untransformed) source bitmap. The crop overlay renders
    /// this, not the surface.
    pub fn source(&self) -> &Bitmap {
        &self.source
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn surface(&self) -> Option<&RenderSurface> {
        self.surface.as_ref()
    }

    pub fn crop_region(&self) -> Option<&CropRegion> {
        match &self.mode {
            Mode::Cropping { region } => Some(region),
            _ => None,
        }
    }

    pub fn title(&self) -> &str {
        self.metadata.title()
    }

    pub fn description(&self) -> &str {
        self.metadata.description()
    }

    /// The registry tracking display handles; exposed for collaborators that
    /// observe resource release.
    pub fn handle_store(&self) -> &HandleStore {
        &self.handles
    }

    /// Id of the handle for the bitmap currently on display.
    pub fn display_handle_id(&self) -> Option<u64> {
        self.display_handle.as_ref().map(DisplayHandle::id)
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Record the dimensions at which the caller displays the image. Zero
    /// dimensions are ignored.
    pub fn set_display_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.display = Some((width, height));
        }
    }

    fn display_dims(&self) -> (u32, u32) {
        self.display
            .unwrap_or((self.source.width, self.source.height))
    }

    // ------------------------------------------------------------------
    // Transform actions (Viewing only)
    // ------------------------------------------------------------------

    /// Advance the rotation by 90 degrees clockwise and re-render.
    pub fn rotate(&mut self) -> Result<(), SessionError> {
        self.guard_viewing("rotate")?;
        self.transform.rotate_cw();
        debug!(degrees = self.transform.rotation_degrees, "rotated");
        self.rerender();
        Ok(())
    }

    /// Toggle the horizontal mirror and re-render.
    pub fn flip_horizontal(&mut self) -> Result<(), SessionError> {
        self.guard_viewing("flip horizontal")?;
        self.transform.toggle_flip_horizontal();
        self.rerender();
        Ok(())
    }

    /// Toggle the vertical mirror and re-render.
    pub fn flip_vertical(&mut self) -> Result<(), SessionError> {
        self.guard_viewing("flip vertical")?;
        self.transform.toggle_flip_vertical();
        self.rerender();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Crop session
    // ------------------------------------------------------------------

    /// Enter crop mode, proposing a centered default selection immediately.
    pub fn begin_crop(&mut self) -> Result<CropRegion, SessionError> {
        self.guard_viewing("crop")?;

        let (dw, dh) = self.display_dims();
        let region = CropRegion::centered_default(dw, dh, self.config.aspect_ratio);
        debug!(?region, "crop session started");
        self.mode = Mode::Cropping { region };
        Ok(region)
    }

    /// Replace the current selection; last write wins, no history.
    pub fn update_crop(&mut self, region: CropRegion) -> Result<(), SessionError> {
        match &mut self.mode {
            Mode::Cropping { region: current } => {
                *current = region;
                Ok(())
            }
            other => Err(SessionError::Guard {
                action: "update crop",
                mode: other.name(),
            }),
        }
    }

    /// Leave crop mode, committing if the selection is valid and cancelling
    /// otherwise.
    ///
    /// On commit the selection maps to natural pixels, the cropped bitmap
    /// becomes the new source, the transform state resets to defaults and
    /// the surface re-initializes.
    pub fn finish_crop(&mut self) -> Result<CropOutcome, SessionError> {
        let region = match &self.mode {
            Mode::Cropping { region } => *region,
            other => {
                return Err(SessionError::Guard {
                    action: "finish crop",
                    mode: other.name(),
                })
            }
        };

        if !region.is_valid() {
            debug!(?region, "crop selection invalid, cancelling");
            self.leave_crop_mode();
            return Ok(CropOutcome::Cancelled);
        }

        let (dw, dh) = self.display_dims();
        let cropped = crop_to_natural(&self.source, &region, dw, dh);
        debug!(
            width = cropped.width,
            height = cropped.height,
            "crop committed"
        );

        self.replace_bitmap(cropped);
        self.mode = Mode::Viewing;
        Ok(CropOutcome::Committed)
    }

    /// Discard the selection and return to viewing; the source and the
    /// transform state are untouched.
    pub fn cancel_crop(&mut self) -> Result<(), SessionError> {
        if !self.mode.is_cropping() {
            return Err(SessionError::Guard {
                action: "cancel crop",
                mode: self.mode.name(),
            });
        }
        debug!("crop session cancelled");
        self.leave_crop_mode();
        Ok(())
    }

    fn leave_crop_mode(&mut self) {
        self.mode = Mode::Viewing;
        // Rendering resumes with the transform state as it was
        self.rerender();
    }

    // ------------------------------------------------------------------
    // File replacement
    // ------------------------------------------------------------------

    /// Replace the source image mid-session (viewing mode only).
    ///
    /// Resets the transform state and re-derives the title from the new
    /// filename; the description is left untouched. A decode failure leaves
    /// the session completely unchanged.
    pub async fn replace_source(
        &mut self,
        bytes: &[u8],
        mime_type: &str,
        filename: &str,
    ) -> Result<(), SessionError> {
        self.guard_viewing("replace file")?;

        // Decode before touching any session state
        let source = decode_source(bytes, mime_type).await?;
        debug!(
            width = source.width,
            height = source.height,
            filename,
            "source replaced"
        );

        self.replace_bitmap(source);
        self.metadata.reset_title_from_filename(filename);
        Ok(())
    }

    /// Install a new source bitmap: transform resets, the surface
    /// re-initializes, the stale display handle is released and the cached
    /// display size is dropped until the caller reports the new layout.
    fn replace_bitmap(&mut self, source: Bitmap) {
        self.source = source;
        self.transform = TransformState::default();
        self.surface = Some(RenderSurface::new(&self.source));
        self.display = None;
        self.display_handle = Some(self.handles.acquire());
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Set the title. Allowed while viewing or cropping.
    pub fn set_title(&mut self, title: &str) -> Result<(), SessionError> {
        self.guard_editable("set title")?;
        self.metadata.set_title(title);
        Ok(())
    }

    /// Set the description, truncated to the character limit at entry.
    /// Allowed while viewing or cropping.
    pub fn set_description(&mut self, description: &str) -> Result<(), SessionError> {
        self.guard_editable("set description")?;
        self.metadata.set_description(description);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Validate, encode and assemble the export record.
    ///
    /// The mode is `Uploading` for the duration of encode+assemble and
    /// `Saved` on success. Validation failures and encode errors leave the
    /// session in `Viewing` with title, description and image intact for
    /// retry.
    pub async fn export(&mut self) -> Result<ExportRecord, ExportError> {
        if !self.mode.is_viewing() {
            return Err(ExportError::Busy(self.mode.name()));
        }
        if self.metadata.title().trim().is_empty() {
            return Err(ExportError::EmptyTitle);
        }

        self.mode = Mode::Uploading;
        debug!(title = self.metadata.title(), "export started");

        let result = self
            .surface
            .as_ref()
            .ok_or(ExportError::SurfaceNotReady)
            .and_then(|surface| {
                build_record(surface, self.metadata.title(), self.metadata.description())
            });

        match result {
            Ok(record) => {
                debug!(bytes = record.blob.len(), "export finished");
                self.mode = Mode::Saved;
                Ok(record)
            }
            Err(err) => {
                // The session survives a failed export for retry
                self.mode = Mode::Viewing;
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Close the session, discarding all state.
    ///
    /// Rejected while an export is in flight: the session is handed back
    /// unchanged. Closing from any other mode releases the display handle
    /// immediately.
    pub fn close(self) -> Result<(), EditSession> {
        if matches!(self.mode, Mode::Uploading) {
            return Err(self);
        }
        debug!(mode = self.mode.name(), "session closed");
        // Dropping self releases the display handle
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Re-render the surface unless a crop session has rendering suspended.
    fn rerender(&mut self) {
        if self.mode.is_cropping() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.render(&self.source, &self.transform);
        }
    }

    fn guard_viewing(&self, action: &'static str) -> Result<(), SessionError> {
        if self.mode.is_viewing() {
            Ok(())
        } else {
            Err(SessionError::Guard {
                action,
                mode: self.mode.name(),
            })
        }
    }

    /// Metadata stays editable during cropping, unlike transforms.
    fn guard_editable(&self, action: &'static str) -> Result<(), SessionError> {
        match self.mode {
            Mode::Viewing | Mode::Cropping { .. } => Ok(()),
            _ => Err(SessionError::Guard {
                action,
                mode: self.mode.name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode a gradient test image to PNG bytes in memory.
    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    async fn open_fixture(width: u32, height: u32) -> EditSession {
        EditSession::open(
            &png_fixture(width, height),
            "image/png",
            "fixture.png",
            SessionConfig::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_open_initializes_session() {
        let session = open_fixture(20, 10).await;

        assert!(session.mode().is_viewing());
        assert_eq!(session.source().width, 20);
        assert_eq!(session.source().height, 10);
        assert!(session.transform().is_identity());
        assert_eq!(session.title(), "fixture");
        assert_eq!(session.description(), "");
        assert_eq!(session.handle_store().live_count(), 1);
    }

    #[tokio::test]
    async fn test_open_rejects_bad_bytes() {
        let result = EditSession::open(
            &[0xDE, 0xAD, 0xBE, 0xEF],
            "image/png",
            "bad.png",
            SessionConfig::default(),
        )
        .await;

        assert!(matches!(result, Err(SessionError::Decode(_))));
    }

    #[tokio::test]
    async fn test_rotate_updates_state_and_surface() {
        let mut session = open_fixture(8, 8).await;
        session.rotate().unwrap();

        assert_eq!(session.transform().rotation_degrees, 90);
        // Surface re-rendered away from the identity copy
        assert_ne!(session.surface().unwrap().bitmap(), session.source());
    }

    #[tokio::test]
    async fn test_four_rotations_restore_rotation() {
        let mut session = open_fixture(8, 8).await;
        for _ in 0..4 {
            session.rotate().unwrap();
        }
        assert_eq!(session.transform().rotation_degrees, 0);
    }

    #[tokio::test]
    async fn test_transforms_guarded_while_cropping() {
        let mut session = open_fixture(10, 10).await;
        session.begin_crop().unwrap();

        assert!(matches!(
            session.rotate(),
            Err(SessionError::Guard { mode: "cropping", .. })
        ));
        assert!(matches!(session.flip_horizontal(), Err(_)));
        assert!(matches!(session.flip_vertical(), Err(_)));
        // State untouched by rejected actions
        assert!(session.transform().is_identity());
    }

    #[tokio::test]
    async fn test_begin_crop_proposes_centered_default() {
        let mut session = open_fixture(100, 100).await;
        let region = session.begin_crop().unwrap();

        assert!(session.mode().is_cropping());
        assert_eq!(region.width_percent, 90.0);
        assert_eq!(region.x_percent, 5.0);
        assert_eq!(session.crop_region(), Some(&region));
    }

    #[tokio::test]
    async fn test_rendering_suspended_while_cropping() {
        let mut session = open_fixture(10, 10).await;
        let before = session.surface().unwrap().bitmap().clone();

        session.begin_crop().unwrap();
        // A guarded transform cannot sneak in a render either
        let _ = session.rotate();

        assert_eq!(session.surface().unwrap().bitmap(), &before);
    }

    #[tokio::test]
    async fn test_update_crop_is_last_write_wins() {
        let mut session = open_fixture(100, 100).await;
        session.begin_crop().unwrap();

        session
            .update_crop(CropRegion::new(0.0, 0.0, 50.0, 50.0))
            .unwrap();
        session
            .update_crop(CropRegion::new(25.0, 25.0, 30.0, 30.0))
            .unwrap();

        assert_eq!(
            session.crop_region(),
            Some(&CropRegion::new(25.0, 25.0, 30.0, 30.0))
        );
    }

    #[tokio::test]
    async fn test_commit_replaces_source_and_resets_transform() {
        let mut session = open_fixture(100, 80).await;
        session.rotate().unwrap();
        session.flip_horizontal().unwrap();

        session.begin_crop().unwrap();
        session
            .update_crop(CropRegion::new(10.0, 10.0, 50.0, 50.0))
            .unwrap();
        let outcome = session.finish_crop().unwrap();

        assert_eq!(outcome, CropOutcome::Committed);
        assert!(session.mode().is_viewing());
        assert_eq!(session.source().width, 50);
        assert_eq!(session.source().height, 40);
        assert!(session.transform().is_identity());
        // Surface re-initialized to the new source
        assert_eq!(session.surface().unwrap().bitmap(), session.source());
    }

    #[tokio::test]
    async fn test_commit_releases_previous_display_handle() {
        let mut session = open_fixture(50, 50).await;
        let first = session.display_handle_id().unwrap();

        session.begin_crop().unwrap();
        session.finish_crop().unwrap();

        assert!(!session.handle_store().is_live(first));
        assert_eq!(session.handle_store().live_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_region_cancels_instead_of_committing() {
        let mut session = open_fixture(50, 50).await;
        let original = session.source().clone();

        session.begin_crop().unwrap();
        session
            .update_crop(CropRegion::new(80.0, 0.0, 50.0, 50.0))
            .unwrap();
        let outcome = session.finish_crop().unwrap();

        assert_eq!(outcome, CropOutcome::Cancelled);
        assert_eq!(session.source(), &original);
        assert!(session.mode().is_viewing());
    }

    #[tokio::test]
    async fn test_cancel_crop_changes_nothing() {
        let mut session = open_fixture(50, 50).await;
        let original = session.source().clone();

        session.begin_crop().unwrap();
        session.cancel_crop().unwrap();

        assert_eq!(session.source(), &original);
        assert!(session.transform().is_identity());
        assert!(session.mode().is_viewing());
        assert_eq!(session.crop_region(), None);
    }

    #[tokio::test]
    async fn test_replace_resets_title_keeps_description() {
        let mut session = open_fixture(20, 20).await;
        session.set_description("survives replacement").unwrap();
        session.rotate().unwrap();

        session
            .replace_source(&png_fixture(30, 15), "image/png", "other.name.png")
            .await
            .unwrap();

        assert_eq!(session.title(), "other");
        assert_eq!(session.description(), "survives replacement");
        assert_eq!(session.source().width, 30);
        assert!(session.transform().is_identity());
    }

    #[tokio::test]
    async fn test_replace_failure_leaves_session_unchanged() {
        let mut session = open_fixture(20, 20).await;
        session.set_title("keep me").unwrap();
        session.rotate().unwrap();
        let source_before = session.source().clone();
        let transform_before = *session.transform();

        let result = session
            .replace_source(&[0x00, 0x01], "image/png", "broken.png")
            .await;

        assert!(result.is_err());
        assert_eq!(session.source(), &source_before);
        assert_eq!(session.transform(), &transform_before);
        assert_eq!(session.title(), "keep me");
    }

    #[tokio::test]
    async fn test_replace_guarded_while_cropping() {
        let mut session = open_fixture(20, 20).await;
        session.begin_crop().unwrap();

        let result = session
            .replace_source(&png_fixture(5, 5), "image/png", "x.png")
            .await;

        assert!(matches!(result, Err(SessionError::Guard { .. })));
    }

    #[tokio::test]
    async fn test_export_empty_title() {
        let mut session = open_fixture(10, 10).await;
        session.set_title("   ").unwrap();

        let result = session.export().await;

        assert!(matches!(result, Err(ExportError::EmptyTitle)));
        assert!(session.mode().is_viewing());
    }

    #[tokio::test]
    async fn test_export_rejected_while_cropping() {
        let mut session = open_fixture(10, 10).await;
        session.begin_crop().unwrap();

        let result = session.export().await;
        assert!(matches!(result, Err(ExportError::Busy("cropping"))));
    }

    #[tokio::test]
    async fn test_export_success_is_terminal() {
        let mut session = open_fixture(10, 10).await;
        session.set_title("done").unwrap();

        let record = session.export().await.unwrap();
        assert_eq!(record.mime_type, "image/jpeg");
        assert_eq!(session.mode(), &Mode::Saved);

        // No further editing once saved
        assert!(matches!(session.rotate(), Err(SessionError::Guard { .. })));
        assert!(matches!(session.set_title("x"), Err(_)));
    }

    #[tokio::test]
    async fn test_close_releases_handles() {
        let session = open_fixture(10, 10).await;
        let store = session.handle_store().clone();
        assert_eq!(store.live_count(), 1);

        session.close().unwrap();
        assert_eq!(store.live_count(), 0);
    }

    #[tokio::test]
    async fn test_close_while_cropping_discards_state() {
        let mut session = open_fixture(10, 10).await;
        session.begin_crop().unwrap();
        let store = session.handle_store().clone();

        assert!(session.close().is_ok());
        assert_eq!(store.live_count(), 0);
    }

    #[tokio::test]
    async fn test_set_display_size_ignores_zero() {
        let mut session = open_fixture(10, 10).await;
        session.set_display_size(0, 5);
        // Crop default still computed against native dimensions
        let region = session.begin_crop().unwrap();
        assert!(region.is_valid());
    }
}
