use std::io::{self, BufRead, Write};
use std::path::Path;

use tw_engine::StepAction;
use tw_session::GameSession;

use crate::config::PlayConfig;
use crate::presenter::Presenter;

pub fn run(
    path: &Path,
    width: Option<usize>,
    config: Option<&Path>,
    no_banners: bool,
) -> Result<(), String> {
    let script = super::load(path)?;

    let mut config = PlayConfig::load(config)?;
    if let Some(width) = width {
        config = config.with_width(width);
    }
    if no_banners {
        config = config.with_banners(false);
    }

    let mut session = GameSession::new(script.machine, script.state_bag);
    let start = session.start();

    let stdin = io::stdin();
    let mut presenter = Presenter::new(io::stdout().lock(), config);
    presenter.title(&script.title).map_err(|e| e.to_string())?;
    presenter.start(&start).map_err(|e| e.to_string())?;
    play_loop(&mut session, stdin.lock(), &mut presenter).map_err(|e| e.to_string())
}

/// Drive a started session from `input` until the end state or EOF.
fn play_loop<R: BufRead, W: Write>(
    session: &mut GameSession,
    mut input: R,
    presenter: &mut Presenter<W>,
) -> io::Result<()> {
    presenter.show(session.machine(), None, &session.bag())?;

    let mut line = String::new();
    loop {
        presenter.print("")?;
        presenter.prompt()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let command = line.trim_end_matches(['\n', '\r']);

        let (outcome, bag) = session.tick(command).map_err(io::Error::other)?;
        presenter.show(session.machine(), Some(&outcome), &bag)?;
        if outcome.action == StepAction::End {
            break;
        }
    }
    Ok(())
}
