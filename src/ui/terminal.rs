use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::app::{App, Command};

/// Spin up the terminal backend, enter the draw loop, and keep processing input
/// until the user quits. The terminal is restored even when the loop fails.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;

    let result = event_loop(&mut terminal, app);
    let cleanup = cleanup_terminal(&mut terminal);
    result.and(cleanup)
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        if !event::poll(Duration::from_millis(250)).context("event polling failed")? {
            continue;
        }
        if let Event::Key(key_event) = event::read().context("failed to read event")? {
            if key_event.kind != KeyEventKind::Press {
                continue;
            }
            let exit = match command_for(&key_event) {
                Some(command) => app.run_command(command)?,
                None => app.handle_key(key_event.code)?,
            };
            if exit {
                return Ok(());
            }
        }
    }
}

/// Map the Ctrl shortcuts onto form commands.
fn command_for(key_event: &KeyEvent) -> Option<Command> {
    if !key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key_event.code {
        KeyCode::Char('n') => Some(Command::Add),
        KeyCode::Char('u') => Some(Command::Update),
        KeyCode::Char('d') => Some(Command::Delete),
        KeyCode::Char('l') => Some(Command::Clear),
        KeyCode::Char('q') | KeyCode::Char('c') => Some(Command::Quit),
        _ => None,
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_shortcuts_map_to_commands() {
        let ctrl = |ch| KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL);
        assert_eq!(command_for(&ctrl('n')), Some(Command::Add));
        assert_eq!(command_for(&ctrl('u')), Some(Command::Update));
        assert_eq!(command_for(&ctrl('d')), Some(Command::Delete));
        assert_eq!(command_for(&ctrl('l')), Some(Command::Clear));
        assert_eq!(command_for(&ctrl('q')), Some(Command::Quit));
        assert_eq!(command_for(&ctrl('x')), None);

        let plain = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(command_for(&plain), None);
    }
}
