mod app;
mod command_processor;
mod config;
mod ui;
mod ui_state;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{env, io, time::Duration};

fn main() -> Result<()> {
    // Initialize logger with debug fallback for development
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("lineola", LevelFilter::Debug);
    }
    logger.init();

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    if let Err(e) = enable_raw_mode() {
        eprintln!("ターミナルの初期化に失敗しました: {}", e);
        return Err(e.into());
    }
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        eprintln!("ターミナルの設定に失敗しました: {}", e);
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let config = match config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config, falling back to defaults: {}", e);
            config::Config::default()
        }
    };
    let mut app = app::App::new(config);

    // Load file from command line if provided
    let args: Vec<String> = env::args().collect();
    if args.len() > 1 {
        let file_path = std::path::PathBuf::from(&args[1]);
        match app.open(file_path) {
            Ok(()) => {
                app.ui_state
                    .set_info_message(format!("ファイルを読み込みました: {}", args[1]));
                log::info!("Successfully loaded file from command line: {}", args[1]);
            }
            Err(e) => {
                app.ui_state
                    .set_error_message(format!("ファイル読み込みエラー: {}", e));
                log::error!("Failed to load file '{}': {}", args[1], e);
            }
        }
    } else {
        log::info!("No file specified, starting with empty buffer");
    }

    let res = run_app(&mut terminal, app);

    // Restore terminal
    restore_terminal()?;

    if let Err(err) = res {
        eprintln!("アプリケーション実行中にエラーが発生しました: {}", err);
        log::error!("Application error: {}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: app::App) -> Result<()> {
    loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
            log::error!("Terminal draw error: {}", e);
            // Continue running despite draw errors
        }

        if app.ui_state.should_quit() {
            log::info!("Application shutdown requested");
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Err(e) = handle_key_event_safe(key, &mut app) {
                        log::error!("Key event handling error: {}", e);
                        app.ui_state
                            .set_error_message(format!("キー処理エラー: {}", e));
                    }
                }
                Event::Resize(_, _) => {
                    log::info!("Terminal resized");
                    // Handled implicitly through next draw
                }
                _ => {}
            }
        }
    }

    log::info!("Application loop ended successfully");
    Ok(())
}

fn handle_key_event_safe(key: crossterm::event::KeyEvent, app: &mut app::App) -> Result<()> {
    // Ctrl+C quits, refusing to drop unsaved changes silently
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        if app.is_modified() {
            app.ui_state.set_info_message(
                "No write since last change (use :q! to override)".to_string(),
            );
        } else {
            log::info!("Exit requested via Ctrl+C");
            app.ui_state.quit();
        }
        return Ok(());
    }

    app.handle_key_event(key)
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    // Attempt to show cursor, but don't fail if it errors
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
