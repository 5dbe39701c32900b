//! Configuration loading and parsing.
//!
//! Parses `asmedit.toml` (or an override path provided by the binary). Every
//! section and field is optional; missing values take the defaults below and
//! unknown fields are ignored. A file that fails to parse is treated as absent.
//!
//! ```toml
//! [editor]
//! tab_size = 4
//! line_height = 18.0
//!
//! [history]
//! backlog = 50
//! debounce_ms = 800
//! commit_interval = 30
//!
//! [syntax]
//! debounce_ms = 500
//! ```
//!
//! Out-of-range values are clamped when loading; each clamp emits an `info!`
//! event under the `config` target naming the field.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "asmedit.toml";

pub const MAX_TAB_SIZE: usize = 16;
pub const MIN_LINE_HEIGHT: f32 = 1.0;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_tab_size")]
    pub tab_size: usize,
    /// Pixel height of one text row, used by pointer hit-testing.
    #[serde(default = "EditorConfig::default_line_height")]
    pub line_height: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: Self::default_tab_size(),
            line_height: Self::default_line_height(),
        }
    }
}

impl EditorConfig {
    const fn default_tab_size() -> usize {
        4
    }
    const fn default_line_height() -> f32 {
        18.0
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistorySection {
    #[serde(default = "HistorySection::default_backlog")]
    pub backlog: usize,
    #[serde(default = "HistorySection::default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "HistorySection::default_commit_interval")]
    pub commit_interval: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            backlog: Self::default_backlog(),
            debounce_ms: Self::default_debounce_ms(),
            commit_interval: Self::default_commit_interval(),
        }
    }
}

impl HistorySection {
    const fn default_backlog() -> usize {
        50
    }
    const fn default_debounce_ms() -> u64 {
        800
    }
    const fn default_commit_interval() -> usize {
        30
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SyntaxSection {
    #[serde(default = "SyntaxSection::default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SyntaxSection {
    fn default() -> Self {
        Self {
            debounce_ms: Self::default_debounce_ms(),
        }
    }
}

impl SyntaxSection {
    const fn default_debounce_ms() -> u64 {
        500
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub history: HistorySection,
    #[serde(default)]
    pub syntax: SyntaxSection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,      // original file string (optional)
    pub path: Option<PathBuf>,    // where `raw` came from
    pub file: ConfigFile,         // parsed (or default) data, clamped
}

/// Best-effort config path: working directory first, then the platform config
/// directory (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("asmedit").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                raw: Some(content),
                path: Some(path),
                file,
            };
            cfg.clamp();
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Pull every field into its usable range. Returns the number of fields changed.
    pub fn clamp(&mut self) -> usize {
        let mut changed = 0;
        let editor = &mut self.file.editor;

        let tab_size = editor.tab_size.clamp(1, MAX_TAB_SIZE);
        if tab_size != editor.tab_size {
            info!(target: "config", raw = editor.tab_size, clamped = tab_size, "editor_tab_size_clamped");
            editor.tab_size = tab_size;
            changed += 1;
        }

        if editor.line_height.is_nan() || editor.line_height < MIN_LINE_HEIGHT {
            info!(target: "config", raw = editor.line_height, clamped = MIN_LINE_HEIGHT, "editor_line_height_clamped");
            editor.line_height = MIN_LINE_HEIGHT;
            changed += 1;
        }

        let history = &mut self.file.history;
        if history.backlog == 0 {
            info!(target: "config", raw = 0, clamped = 1, "history_backlog_clamped");
            history.backlog = 1;
            changed += 1;
        }
        if history.commit_interval == 0 {
            info!(target: "config", raw = 0, clamped = 1, "history_commit_interval_clamped");
            history.commit_interval = 1;
            changed += 1;
        }
        changed
    }

    pub fn tab_size(&self) -> usize {
        self.file.editor.tab_size
    }

    pub fn line_height(&self) -> f32 {
        self.file.editor.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
        assert_eq!(cfg.tab_size(), 4);
        assert_eq!(cfg.file.history.debounce(), Duration::from_millis(800));
        assert_eq!(cfg.file.syntax.debounce(), Duration::from_millis(500));
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let tmp = write_config(
            "[editor]\ntab_size = 2\nline_height = 20.5\n\
             [history]\nbacklog = 10\ndebounce_ms = 250\ncommit_interval = 5\n\
             [syntax]\ndebounce_ms = 100\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.tab_size(), 2);
        assert_eq!(cfg.line_height(), 20.5);
        assert_eq!(
            cfg.file.history,
            HistorySection {
                backlog: 10,
                debounce_ms: 250,
                commit_interval: 5
            }
        );
        assert_eq!(cfg.file.syntax.debounce_ms, 100);
        assert_eq!(cfg.path.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let tmp = write_config("[history]\nbacklog = 7\nunknown_field = true\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.history.backlog, 7);
        assert_eq!(cfg.file.history.commit_interval, 30);
        assert_eq!(cfg.file.editor, EditorConfig::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = write_config("[editor\ntab_size = ");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn clamps_out_of_range_values() {
        let tmp = write_config(
            "[editor]\ntab_size = 0\nline_height = -3.0\n\
             [history]\nbacklog = 0\ncommit_interval = 0\n",
        );
        let mut cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.tab_size(), 1);
        assert_eq!(cfg.line_height(), MIN_LINE_HEIGHT);
        assert_eq!(cfg.file.history.backlog, 1);
        assert_eq!(cfg.file.history.commit_interval, 1);
        assert_eq!(cfg.clamp(), 0);

        cfg.file.editor.tab_size = 99;
        assert_eq!(cfg.clamp(), 1);
        assert_eq!(cfg.tab_size(), MAX_TAB_SIZE);
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let mut cfg = Config::default();
        cfg.file.editor.tab_size = 40;
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        with_default(subscriber, || {
            cfg.clamp();
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("editor_tab_size_clamped"));
        assert_eq!(cfg.tab_size(), MAX_TAB_SIZE);
    }
}
