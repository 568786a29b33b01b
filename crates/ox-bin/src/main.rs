//! Oxidized entrypoint: a small terminal demo wiring REX-powered search and
//! the TEXT gap-buffer engine into a runnable modeless editor.

use anyhow::Result;
use clap::Parser;
use core_actions::io_ops::{OpenFileResult, WriteFileResult, open_file, write_file};
use core_actions::search_ops::{FindRequest, find_in_active_buffer};
use core_config::{Config, SearchConfig, load_from};
use core_render::text_render::{CaretStyle, CellFont, Font, draw_gutter, draw_text_row, paint_caret};
use core_render::{CellFlags, Frame};
use core_state::EditorState;
use core_terminal::{CrosstermBackend, TerminalBackend};
use core_text::layout::{Row, RowIndex, Wrap};
use core_text::style::StyleTable;
use core_text::Buffer;
use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, SetAttribute};
use crossterm::{cursor::MoveTo, queue, style::Print, terminal::{Clear, ClearType}};
use std::io::{Write as _, stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const GUTTER_WIDTH: u16 = 5;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxidized", version, about = "Oxidized editor")]
struct Args {
    /// Optional path to open at startup (UTF-8 text). If omitted a blank buffer is used.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `oxidized.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
    configure_logging();
    let args = Args::parse();
    let config = load_from(args.config.clone())?;

    let mut backend = CrosstermBackend::new();
    backend.set_title("Oxidized")?;
    let _guard = backend.enter_guard()?;

    let mut editor = Editor::new(args.path.as_deref(), &config)?;
    info!(target: "runtime", "startup");

    loop {
        let (width, height) = crossterm::terminal::size()?;
        editor.render(width, height)?;

        if event::poll(Duration::from_millis(200))? {
            if let CtEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if editor.handle_key(key) {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn configure_logging() {
    let log_path = Path::new("oxidized.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(log_path);
    }
    let file_appender = tracing_appender::rolling::never(".", "oxidized.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    // Leak the guard: this process owns the log file for its whole lifetime,
    // and main() has no natural place to hold it across the event loop.
    std::mem::forget(guard);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init();
}

struct Editor {
    state: EditorState,
    cursor: usize,
    rows: RowIndex,
    style_table: StyleTable,
    first_visible_row: usize,
    search_cfg: SearchConfig,
    searching: Option<String>,
    status: Option<String>,
}

impl Editor {
    fn new(path: Option<&Path>, config: &Config) -> Result<Self> {
        let state = match path {
            Some(p) => match open_file(p) {
                OpenFileResult::Success(opened) => {
                    let mut state = EditorState::new(opened.buffer);
                    state.file_name = Some(opened.file_name);
                    state.original_line_ending = opened.original_line_ending;
                    state.had_trailing_newline = opened.had_trailing_newline;
                    if opened.mixed_line_endings {
                        warn!(target: "io", "mixed_line_endings_detected_startup");
                    }
                    state
                }
                OpenFileResult::Error => {
                    let mut state = EditorState::new(Buffer::from_str("untitled", "")?);
                    state.set_ephemeral("open failed", Duration::from_secs(3));
                    state
                }
            },
            None => EditorState::new(Buffer::from_str("untitled", "")?),
        };

        Ok(Self {
            state,
            cursor: 0,
            rows: RowIndex::new(),
            style_table: StyleTable::new(),
            first_visible_row: 0,
            search_cfg: config.file.search.clone(),
            searching: None,
            status: None,
        })
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Some(mut pattern) = self.searching.take() {
            match key.code {
                KeyCode::Esc => self.status = Some("search cancelled".into()),
                KeyCode::Enter => self.run_search(&pattern),
                KeyCode::Backspace => {
                    pattern.pop();
                    self.searching = Some(pattern);
                }
                KeyCode::Char(c) => {
                    pattern.push(c);
                    self.searching = Some(pattern);
                }
                _ => self.searching = Some(pattern),
            }
            return false;
        }

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.save(),
            KeyCode::Char('/') => self.searching = Some(String::new()),
            KeyCode::Enter => self.insert_char('\n'),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Tab => self.insert_char('\t'),
            _ => {}
        }
        false
    }

    fn insert_char(&mut self, ch: char) {
        let mut encoded = [0u8; 4];
        let text = ch.encode_utf8(&mut encoded);
        self.state
            .active_buffer_mut()
            .replace(self.cursor, 0, text.as_bytes(), None);
        self.cursor += text.len();
        self.state.dirty = true;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.state.active_buffer().dec(self.cursor);
        let ndel = self.cursor - prev;
        self.state.active_buffer_mut().replace(prev, ndel, &[], None);
        self.cursor = prev;
        self.state.dirty = true;
    }

    fn delete_forward(&mut self) {
        let buffer = self.state.active_buffer();
        if self.cursor >= buffer.len() {
            return;
        }
        let next = buffer.inc(self.cursor);
        let ndel = next - self.cursor;
        self.state.active_buffer_mut().replace(self.cursor, ndel, &[], None);
        self.state.dirty = true;
    }

    fn move_left(&mut self) {
        self.cursor = self.state.active_buffer().dec(self.cursor);
    }

    fn move_right(&mut self) {
        self.cursor = self.state.active_buffer().inc(self.cursor);
    }

    fn move_up(&mut self) {
        let row_idx = self.rows.row_from_pos(self.cursor);
        if row_idx == 0 {
            return;
        }
        let col = column_of(self.state.active_buffer(), self.rows.rows()[row_idx], self.cursor);
        self.cursor = position_at_column(self.state.active_buffer(), self.rows.rows()[row_idx - 1], col);
    }

    fn move_down(&mut self) {
        let row_idx = self.rows.row_from_pos(self.cursor);
        if row_idx + 1 >= self.rows.nrows() {
            return;
        }
        let col = column_of(self.state.active_buffer(), self.rows.rows()[row_idx], self.cursor);
        self.cursor = position_at_column(self.state.active_buffer(), self.rows.rows()[row_idx + 1], col);
    }

    fn run_search(&mut self, pattern: &str) {
        let request = FindRequest {
            pattern,
            start: self.cursor,
            backward: false,
            wrap: true,
        };
        match find_in_active_buffer(&self.state, &self.search_cfg, &request) {
            Ok(Some(found)) => {
                self.cursor = found.start;
                self.status = Some(format!("/{pattern}"));
            }
            Ok(None) => self.status = Some(format!("/{pattern}: not found")),
            Err(err) => self.status = Some(format!("/{pattern}: {}", err.message())),
        }
    }

    fn save(&mut self) {
        self.status = Some(match write_file(&mut self.state, None) {
            WriteFileResult::Success => "written".to_string(),
            WriteFileResult::NoFilename => "no file name".to_string(),
            WriteFileResult::Error => "write failed".to_string(),
        });
    }

    fn render(&mut self, width: u16, height: u16) -> Result<()> {
        if height == 0 || width <= GUTTER_WIDTH {
            return Ok(());
        }
        let text_width = (width - GUTTER_WIDTH) as usize;
        let text_height = height - 1; // reserve the last row for the status line
        self.rows.rebuild(self.state.active_buffer(), Wrap::Word(text_width.max(1)));

        let cursor_row = self.rows.row_from_pos(self.cursor);
        if cursor_row < self.first_visible_row {
            self.first_visible_row = cursor_row;
        } else if cursor_row >= self.first_visible_row + text_height as usize {
            self.first_visible_row = cursor_row + 1 - text_height as usize;
        }

        let mut frame = Frame::new(width, height);
        let font = CellFont;
        draw_gutter(&mut frame, GUTTER_WIDTH, self.first_visible_row, text_height as usize);

        for screen_y in 0..text_height {
            let row_idx = self.first_visible_row + screen_y as usize;
            let Some(&row) = self.rows.rows().get(row_idx) else {
                break;
            };
            draw_text_row(
                &mut frame,
                &font,
                self.state.active_buffer(),
                &self.style_table,
                row,
                row_idx,
                screen_y,
                GUTTER_WIDTH,
                None,
                None,
                Some(cursor_row),
            );
        }

        let status_y = height - 1;
        for (x, ch) in self.status_line().chars().enumerate() {
            if x as u16 >= width {
                break;
            }
            frame.set_cluster(x as u16, status_y, &ch.to_string(), 1, CellFlags::REVERSE);
        }

        if let Some(&row) = self.rows.rows().get(cursor_row) {
            let col = column_of(self.state.active_buffer(), row, self.cursor);
            let caret_y = (cursor_row - self.first_visible_row) as u16;
            paint_caret(&mut frame, GUTTER_WIDTH + col, caret_y, 1, CaretStyle::Insert);
        }

        emit_frame(&frame)
    }

    fn status_line(&self) -> String {
        if let Some(pattern) = &self.searching {
            return format!("/{pattern}");
        }
        let name = self
            .state
            .file_name
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("[No Name]");
        let dirty = if self.state.dirty { "*" } else { "" };
        match &self.status {
            Some(s) => format!("{name}{dirty}  {s}"),
            None => format!("{name}{dirty}  Ctrl-S save  Ctrl-Q quit  / search"),
        }
    }
}

/// Visual column of `pos` within `row`, summing character widths from the
/// row's start.
fn column_of(buffer: &Buffer, row: Row, pos: usize) -> u16 {
    let font = CellFont;
    let mut col = 0u16;
    let mut p = row.start;
    while p < pos && p < row.end {
        let ch = buffer.char_at(p).unwrap_or(' ');
        col += font.char_width(ch).max(1);
        p = buffer.inc(p);
    }
    col
}

/// Inverse of [`column_of`]: the byte position within `row` at visual column
/// `target_col`, clamped to the row's end.
fn position_at_column(buffer: &Buffer, row: Row, target_col: u16) -> usize {
    let font = CellFont;
    let mut col = 0u16;
    let mut p = row.start;
    while p < row.end && col < target_col {
        let ch = buffer.char_at(p).unwrap_or(' ');
        col += font.char_width(ch).max(1);
        p = buffer.inc(p);
    }
    p
}

fn emit_frame(frame: &Frame) -> Result<()> {
    let mut out = stdout();
    for y in 0..frame.height {
        queue!(out, MoveTo(0, y), Clear(ClearType::CurrentLine))?;
        for (cluster, _width, flags, x) in frame.row_leaders(y) {
            queue!(out, MoveTo(x, y))?;
            if flags.intersects(CellFlags::REVERSE | CellFlags::CURSOR | CellFlags::SELECTED | CellFlags::HIGHLIGHT) {
                queue!(out, SetAttribute(Attribute::Reverse), Print(cluster), SetAttribute(Attribute::NoReverse))?;
            } else if flags.contains(CellFlags::BOLD) {
                queue!(out, SetAttribute(Attribute::Bold), Print(cluster), SetAttribute(Attribute::NormalIntensity))?;
            } else {
                queue!(out, Print(cluster))?;
            }
        }
    }
    out.flush()?;
    Ok(())
}
