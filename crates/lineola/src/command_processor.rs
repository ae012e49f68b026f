use anyhow::Result;
use std::path::PathBuf;

use linecore::{BufferError, LineBuffer};

pub struct CommandProcessor;

impl CommandProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        command: &str,
        buffer: &mut LineBuffer,
        should_quit: &mut bool,
    ) -> Result<String> {
        let cmd = command.trim();

        if cmd.is_empty() {
            return Ok(String::new());
        }

        let parts: Vec<&str> = cmd.split_whitespace().collect();

        match parts[0] {
            "w" => {
                // :w - save file, :w filename - save as
                if parts.len() > 1 {
                    let path = PathBuf::from(parts[1]);
                    buffer.save_to(path)?;
                    Ok(format!(
                        "{} 行を '{}' に書き込みました",
                        buffer.line_count(),
                        parts[1]
                    ))
                } else {
                    match buffer.save() {
                        Ok(()) => Ok(format!("{} 行を書き込みました", buffer.line_count())),
                        Err(BufferError::PathUnset) => {
                            Err(anyhow::anyhow!("No file name specified"))
                        }
                        Err(e) => Err(e.into()),
                    }
                }
            }
            "q" => {
                // :q - quit
                if buffer.is_modified() {
                    Ok("No write since last change (use :q! to override)".to_string())
                } else {
                    *should_quit = true;
                    Ok("Quitting".to_string())
                }
            }
            "q!" => {
                // :q! - force quit
                *should_quit = true;
                Ok("Force quitting".to_string())
            }
            "wq" => {
                // :wq - save and quit
                if buffer.path().is_none() {
                    return Err(anyhow::anyhow!("No file name specified"));
                }
                buffer.save()?;
                *should_quit = true;
                Ok(format!(
                    "{} 行を書き込みました - Quitting",
                    buffer.line_count()
                ))
            }
            _ => Err(anyhow::anyhow!("E492: Not an editor command: {}", parts[0])),
        }
    }
}

impl Default for CommandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_command_is_a_no_op() {
        let processor = CommandProcessor::new();
        let mut buffer = LineBuffer::new();
        let mut quit = false;

        let result = processor.execute("  ", &mut buffer, &mut quit).unwrap();
        assert_eq!(result, "");
        assert!(!quit);
    }

    #[test]
    fn test_write_without_path_fails() {
        let processor = CommandProcessor::new();
        let mut buffer = LineBuffer::new();
        let mut quit = false;

        let result = processor.execute("w", &mut buffer, &mut quit);
        assert!(result.is_err());
    }

    #[test]
    fn test_write_with_path_saves_and_binds() {
        let processor = CommandProcessor::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut buffer = LineBuffer::new();
        buffer.set_line(0, b"saved by command").unwrap();
        let mut quit = false;

        let command = format!("w {}", path.display());
        let result = processor.execute(&command, &mut buffer, &mut quit);
        assert!(result.is_ok());
        assert_eq!(fs::read(&path).unwrap(), b"saved by command\n");
        assert!(!buffer.is_modified());
        assert!(!quit);
    }

    #[test]
    fn test_quit_refuses_unsaved_changes() {
        let processor = CommandProcessor::new();
        let mut buffer = LineBuffer::new();
        buffer.set_line(0, b"dirty").unwrap();
        let mut quit = false;

        let result = processor.execute("q", &mut buffer, &mut quit).unwrap();
        assert!(result.contains("No write since last change"));
        assert!(!quit);

        let result = processor.execute("q!", &mut buffer, &mut quit).unwrap();
        assert_eq!(result, "Force quitting");
        assert!(quit);
    }

    #[test]
    fn test_quit_on_clean_buffer() {
        let processor = CommandProcessor::new();
        let mut buffer = LineBuffer::new();
        let mut quit = false;

        let result = processor.execute("q", &mut buffer, &mut quit).unwrap();
        assert_eq!(result, "Quitting");
        assert!(quit);
    }

    #[test]
    fn test_write_quit() {
        let processor = CommandProcessor::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("wq.txt");
        let mut buffer = LineBuffer::from_path(&path).unwrap();
        buffer.set_line(0, b"both").unwrap();
        let mut quit = false;

        let result = processor.execute("wq", &mut buffer, &mut quit).unwrap();
        assert!(result.contains("Quitting"));
        assert!(quit);
        assert_eq!(fs::read(&path).unwrap(), b"both\n");
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let processor = CommandProcessor::new();
        let mut buffer = LineBuffer::new();
        let mut quit = false;

        let result = processor.execute("frobnicate", &mut buffer, &mut quit);
        assert!(result.unwrap_err().to_string().contains("E492"));
        assert!(!quit);
    }
}
