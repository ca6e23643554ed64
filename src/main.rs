//! Headless game shell
//!
//! Drives the fixed-timestep simulation with a simple autopilot, draining
//! audio commands and game events each frame. Rendering front-ends hook in
//! the same way: feed `TickInput`, drain the queues, read the HUD numbers.

use std::path::Path;

use brickfall::audio::{AudioCommand, QueuedAudio};
use brickfall::consts::{MAX_SUBSTEPS, SIM_DT};
use brickfall::levels::{LevelLibrary, LevelSource};
use brickfall::settings::Settings;
use brickfall::sim::{
    BallState, GameEvent, GamePhase, Session, TickInput, new_game, next_level, tick,
};

struct Game {
    session: Session,
    levels: LevelLibrary,
    audio: QueuedAudio,
    input: TickInput,
    accumulator: f32,
}

impl Game {
    /// Run simulation ticks for one frame's worth of wall time
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            tick(&mut self.session, &input, SIM_DT, &mut self.audio);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.launch = false;
            self.input.pause = false;
        }
    }

    /// Autopilot: serve when waiting, then keep the paddle under the most
    /// urgent target (lowest ball, else nearest pickup)
    fn drive(&mut self) {
        if self.session.phase == GamePhase::Serve {
            self.input.launch = true;
        }

        let chasing_ball = self
            .session
            .balls
            .iter()
            .filter(|b| matches!(b.state, BallState::Free))
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|b| b.pos.x);

        self.input.target_x = chasing_ball.or_else(|| {
            self.session
                .pickups
                .iter()
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|p| p.pos.x)
        });
    }

    /// Drain frame output; returns false once the run is over
    fn pump_events(&mut self) -> bool {
        for command in self.audio.drain() {
            match command {
                AudioCommand::Play(effect) => log::debug!("sfx: {effect:?}"),
                AudioCommand::MusicPitch(pitch) => log::debug!("music pitch: {pitch:.2}"),
            }
        }

        for event in self.session.drain_events() {
            match event {
                GameEvent::LevelCleared => {
                    // Advance on the explicit signal, never mid-tick
                    match next_level(&mut self.session, &self.levels) {
                        Ok(advance) => log::info!("Advance: {advance:?}"),
                        Err(err) => log::error!("Staying on current level: {err}"),
                    }
                }
                GameEvent::GameOver => log::info!("Game over"),
                _ => {}
            }
        }

        !matches!(
            self.session.phase,
            GamePhase::GameOver | GamePhase::GameWon
        )
    }
}

fn main() {
    env_logger::init();
    log::info!("Brickfall starting...");

    let settings = Settings::load(Path::new(Settings::FILE_NAME));

    let levels = match std::env::args().nth(1) {
        Some(path) => match LevelLibrary::from_file(Path::new(&path)) {
            Ok(library) => library,
            Err(err) => {
                log::error!("Falling back to built-in levels: {err}");
                LevelLibrary::default_campaign()
            }
        },
        None => LevelLibrary::default_campaign(),
    };
    log::info!("{} levels loaded", levels.level_count());

    let seed = settings.fixed_seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });

    let mut session = Session::new(seed);
    if let Err(err) = new_game(&mut session, &levels) {
        log::error!("Could not start game: {err}");
        return;
    }
    log::info!("Game initialized with seed: {seed}");

    let mut game = Game {
        session,
        levels,
        audio: QueuedAudio::new(),
        input: TickInput::default(),
        accumulator: 0.0,
    };

    // Autopilot run: at most ten minutes of simulated play
    let frame_dt = 1.0 / 60.0;
    let max_frames = 10 * 60 * 60;
    for _ in 0..max_frames {
        game.drive();
        game.update(frame_dt);
        if !game.pump_events() {
            break;
        }
    }

    log::info!(
        "Run finished: level {}, score {}, lives {}, clock {}s",
        game.session.level_id,
        game.session.player.score,
        game.session.player.lives,
        game.session.clock_readout(),
    );
}
