use std::io;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use stately::demo::{
    DirectoryLookup, LoopbackConnection, operations, plugin_registry, sample_state, state_shape,
};
use stately::forms::{Form, Panel};
use stately::session::{SessionContext, UserProfile};
use stately::terminal::{KeyCode, Terminal, TerminalEvent};
use stately::widgets::inspector::Inspector;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

fn main() -> io::Result<()> {
    let mut ctx = SessionContext::new(
        Arc::new(LoopbackConnection::new()),
        Arc::new(DirectoryLookup::new()),
        UserProfile::new("u1", "human"),
    );
    ctx.apply_snapshot(sample_state(), now_millis());

    let forms: Vec<Form> = operations().into_iter().map(Form::new).collect();
    let inspector = Inspector::new("inspector", "state", state_shape(), plugin_registry())
        .with_max_visible(18);
    let mut panel = Panel::new(forms, inspector);
    panel.set_snapshot(&ctx);

    let mut terminal = Terminal::new()?;
    terminal.enter()?;
    let result = run(&mut terminal, &mut panel, &mut ctx);
    terminal.exit()?;
    result
}

fn run(terminal: &mut Terminal, panel: &mut Panel, ctx: &mut SessionContext) -> io::Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.render(&panel.draw(terminal.size().width))?;
            dirty = false;
        }
        match terminal.poll_event(POLL_INTERVAL)? {
            TerminalEvent::Key(key) => {
                if !panel.is_visible() {
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        _ => {
                            panel.show();
                            dirty = true;
                        }
                    }
                    continue;
                }
                dirty |= panel.handle_key(key, ctx);
            }
            TerminalEvent::Resize(_) => dirty = true,
            TerminalEvent::Tick => {
                dirty |= panel.tick();
            }
        }
    }
}
