use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use rfp_core::{update, AppState, AppViewModel, Msg};
use rfp_logging::rfp_warn;

use crate::effects::EffectRunner;
use crate::render::TerminalRenderer;

const TICK: Duration = Duration::from_millis(75);

/// One CLI run: the state machine, the engine behind it, and the terminal.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer<Stdout>,
}

impl Session {
    pub fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: TerminalRenderer::new(io::stdout()),
        }
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);
        if state.consume_dirty() {
            if let Err(err) = self.renderer.render(&state.view()) {
                rfp_warn!("Could not write to terminal: {}", err);
            }
        }
        self.state = state;
    }

    pub fn dispatch_all(&mut self, msgs: impl IntoIterator<Item = Msg>) {
        for msg in msgs {
            self.dispatch(msg);
        }
    }

    /// Feed engine results into the state machine until `done` holds for
    /// the current view, and return that view. Fails if the engine stops
    /// before that happens.
    pub fn run_until(&mut self, done: impl Fn(&AppViewModel) -> bool) -> Result<AppViewModel> {
        loop {
            let view = self.view();
            if done(&view) {
                return Ok(view);
            }
            let msg = self
                .runner
                .next_msg(TICK)
                .context("Engine stopped before the request finished")?
                .unwrap_or(Msg::Tick);
            self.dispatch(msg);
        }
    }

    /// Leave the current page so its outstanding requests are cancelled.
    pub fn close(mut self) -> Result<()> {
        self.dispatch(Msg::Navigate(rfp_core::Page::Main));
        io::Write::flush(self.renderer.out()).context("flushing terminal")
    }
}
