use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::time::{Duration, Instant};

mod alerts;
mod app;
mod config;
mod document;
mod ipc;
mod langs;
mod persistence;
mod platform;
mod session;
mod ui;

use alerts::{AlertDispatcher, AlertEvent};
use app::{App, Mode};
use ipc::server::CommandSender;
use persistence::Store;
use platform::{Clipboard, CommandSpeaker, DataUriPlayer, TerminalBell};

fn main() -> Result<()> {
    let store = Store::open()?;
    init_logging(&store);

    let session = persistence::load_session(&store);
    let display = config::load_config()?;
    let dispatcher = AlertDispatcher::new(
        Box::new(CommandSpeaker::detect()),
        Box::new(DataUriPlayer::detect(store.dir())),
        Box::new(TerminalBell),
    );
    let app = App::new(
        session,
        store,
        display,
        dispatcher,
        Box::new(Clipboard::detect()),
    );

    // IPC runs on its own thread; commands come back over the channel and
    // are applied between frames, so session state stays on this thread.
    let (tx, rx) = std::sync::mpsc::channel();
    spawn_ipc_server(tx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn init_logging(store: &Store) {
    let Ok(file) = std::fs::File::create(store.dir().join("pacer.log")) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn spawn_ipc_server(tx: CommandSender) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!("could not start IPC runtime: {e}");
                return;
            }
        };
        if let Err(e) = runtime.block_on(ipc::server::start(tx)) {
            tracing::error!("IPC server stopped: {e}");
        }
    });
}

type CommandReceiver =
    std::sync::mpsc::Receiver<(pacer_ipc::Command, tokio::sync::oneshot::Sender<pacer_ipc::Response>)>;

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    rx: CommandReceiver,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;
        app.expire_notice();

        // Commands queued by IPC clients since the last frame
        while let Ok((command, reply)) = rx.try_recv() {
            let response = app.handle_command(command);
            let _ = reply.send(response);
        }

        if app.session.running {
            while last_tick.elapsed() >= Duration::from_secs(1) {
                last_tick += Duration::from_secs(1);
                app.tick();
            }
        } else {
            last_tick = Instant::now();
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key.code);
                }
            }
        }

        if app.should_quit {
            if let Err(e) = persistence::save_session(&app.store, &app.session) {
                tracing::warn!("could not save session on exit: {e}");
            }
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match app.mode {
        Mode::Normal => match code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char(' ') => app.toggle_timer(),
            KeyCode::Char('r') => app.reset(),
            KeyCode::Char('t') => app.add_ten(),
            KeyCode::Char('s') => app.skip_to_next(),
            KeyCode::Char('n') => app.switch_phase(),
            KeyCode::Up | KeyCode::Char('k') => app.select_up(),
            KeyCode::Down | KeyCode::Char('j') => app.select_down(),
            KeyCode::Char('a') => app.add_phase(),
            KeyCode::Char('d') => app.remove_selected_phase(),
            KeyCode::Char('K') => app.move_selected_phase(-1),
            KeyCode::Char('J') => app.move_selected_phase(1),
            KeyCode::Char('e') => {
                if !app.session.phases.is_empty() {
                    app.mode = Mode::EditingTitle(app.selected_phase);
                    app.input_buffer.clear();
                }
            }
            KeyCode::Char('m') => {
                if !app.session.phases.is_empty() {
                    app.mode = Mode::EditingMinutes(app.selected_phase);
                    app.input_buffer.clear();
                }
            }
            KeyCode::Char('c') => {
                if !app.session.phases.is_empty() {
                    app.mode = Mode::EditingColor(app.selected_phase);
                    app.input_buffer.clear();
                }
            }
            KeyCode::Char('v') => app.mode = Mode::SelectingAlert,
            KeyCode::Char('l') => app.cycle_lang(),
            KeyCode::Char('T') => app.toggle_theme(),
            KeyCode::Char('u') => app.toggle_use_recording(),
            KeyCode::Char('i') => {
                app.mode = Mode::ImportPath;
                app.input_buffer.clear();
            }
            KeyCode::Char('x') => {
                app.mode = Mode::ExportPath;
                app.input_buffer.clear();
            }
            KeyCode::Char('S') => app.share(),
            KeyCode::Char('?') => app.mode = Mode::ShowHelp,
            _ => {}
        },
        Mode::SelectingAlert => match code {
            KeyCode::Esc => app.mode = Mode::Normal,
            KeyCode::Char(c) if c.is_numeric() => {
                let num = c.to_digit(10).unwrap_or(0) as usize;
                if num > 0 && num <= AlertEvent::ALL.len() {
                    let event = AlertEvent::ALL[num - 1];
                    app.input_buffer = app
                        .session
                        .alerts_text
                        .get(event.key())
                        .cloned()
                        .unwrap_or_default();
                    app.mode = Mode::EditingAlert(event);
                }
            }
            _ => {}
        },
        Mode::ShowHelp => {
            if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                app.mode = Mode::Normal;
            }
        }
        _ => match code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Enter => app.handle_char('\n'),
            KeyCode::Backspace => app.handle_backspace(),
            KeyCode::Char(c) => app.handle_char(c),
            _ => {}
        },
    }
}
