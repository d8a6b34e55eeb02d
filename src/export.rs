//! Session exports: response text and synthesized audio
//!
//! Persistence ends here; nothing else survives the session.

use chrono::Local;
use std::path::Path;
use tracing::info;

use crate::Result;

/// Default file name for a text export, timestamped to avoid clobbering
pub fn default_text_name() -> String {
    format!("response_{}.txt", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Default file name for an MP3 export
pub fn default_audio_name() -> String {
    format!("response_{}.mp3", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write the response text as a UTF-8 file
pub fn save_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text)?;
    info!("response text saved to {}", path.display());
    Ok(())
}

/// Write synthesized speech as an MP3 file
pub fn save_audio(path: &Path, mp3: &[u8]) -> Result<()> {
    std::fs::write(path, mp3)?;
    info!("response audio saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_text_roundtrip() {
        let dir = std::env::temp_dir().join("sketchsolve_export_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("answer.txt");

        save_text(&path, "x = 7").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x = 7");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_audio_writes_bytes() {
        let dir = std::env::temp_dir().join("sketchsolve_export_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("answer.mp3");

        save_audio(&path, &[0xff, 0xfb, 0x90, 0x00]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xff, 0xfb, 0x90, 0x00]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_default_names_carry_extension() {
        assert!(default_text_name().starts_with("response_"));
        assert!(default_text_name().ends_with(".txt"));
        assert!(default_audio_name().ends_with(".mp3"));
    }

    #[test]
    fn test_save_to_missing_directory_fails_recoverably() {
        let path = Path::new("/nonexistent_sketchsolve_dir/answer.txt");
        let err = save_text(path, "x").unwrap_err();
        assert!(matches!(err, crate::SketchSolveError::IOError(_)));
        // A bad save location only costs a retry, not the session
        assert!(err.is_recoverable());
    }
}
