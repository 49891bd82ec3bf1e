//! Console display surface

use std::io::{stdout, Write};
use std::path::PathBuf;

use face_core::{DisplaySurface, Frame, MonospaceMetrics, SurfaceInfo, TextMetrics};
use log::{debug, warn};

use crate::config::DisplayConfig;
use crate::media::rasterize;

/// Prints the text of each frame on one line, rewriting it in place, and
/// optionally keeps a png snapshot of the latest frame.
pub struct ConsoleSurface {
    info: SurfaceInfo,
    metrics: MonospaceMetrics,
    snapshot: Option<PathBuf>,
    last_line: String,
    last_snapshot: Option<Frame>,
}

impl ConsoleSurface {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            info: config.surface_info(),
            metrics: MonospaceMetrics::default(),
            snapshot: config.snapshot.clone(),
            last_line: String::new(),
            last_snapshot: None,
        }
    }

    /// Save a png of the frame, unless it matches the last one saved.
    /// Returns whether a file was written.
    fn write_snapshot(&mut self, frame: &Frame) -> bool {
        let Some(path) = &self.snapshot else {
            return false;
        };
        if self.last_snapshot.as_ref() == Some(frame) {
            return false;
        }
        if let Err(e) = rasterize(frame).save(path) {
            warn!("failed to write snapshot to {}: {e}", path.display());
            return false;
        }
        self.last_snapshot = Some(frame.clone());
        true
    }
}

/// One console line for a frame
pub fn frame_line(frame: &Frame) -> String {
    frame.texts().collect::<Vec<_>>().join("  ")
}

impl DisplaySurface for ConsoleSurface {
    fn info(&self) -> SurfaceInfo {
        self.info
    }

    fn metrics(&self) -> &dyn TextMetrics {
        &self.metrics
    }

    fn draw(&mut self, frame: &Frame) -> std::io::Result<()> {
        let line = frame_line(frame);
        debug!("draw {} commands: {line}", frame.commands.len());
        if line != self.last_line {
            let width = self.last_line.chars().count().max(line.chars().count());
            let mut out = stdout();
            write!(out, "\r{line:width$}")?;
            out.flush()?;
            self.last_line = line;
        }
        self.write_snapshot(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use face_core::{DrawCommand, Rgb};

    use super::*;

    fn text(text: &str) -> DrawCommand {
        DrawCommand::Text {
            text: text.into(),
            x: 0.0,
            y: 0.0,
            size: 20.0,
            bold: false,
            color: Rgb::WHITE.with_alpha(255),
            anti_alias: true,
        }
    }

    fn frame(time: &str) -> Frame {
        Frame {
            width: 8,
            height: 8,
            commands: vec![
                DrawCommand::Fill {
                    color: Rgb::BLACK.with_alpha(255),
                },
                text(time),
            ],
        }
    }

    #[test]
    fn snapshots_only_changed_frames() {
        let dir = std::env::temp_dir().join(format!("sunshine-face-snap-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut surface = ConsoleSurface::new(&DisplayConfig {
            snapshot: Some(dir.join("face.png")),
            ..Default::default()
        });

        assert!(surface.write_snapshot(&frame("12:00")));
        assert!(dir.join("face.png").exists());
        assert!(!surface.write_snapshot(&frame("12:00")));
        assert!(surface.write_snapshot(&frame("12:01")));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn frame_line_joins_texts() {
        let frame = Frame {
            width: 320,
            height: 320,
            commands: vec![
                DrawCommand::Fill {
                    color: Rgb::BLACK.with_alpha(255),
                },
                text("12:00"),
                text("Sun, Oct 30 2016"),
            ],
        };
        assert_eq!(frame_line(&frame), "12:00  Sun, Oct 30 2016");
    }
}
