use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event},
    execute, terminal,
};
use directories::ProjectDirs;
use flappy_stage::audio::{AudioSink, Silent, Sound, Synth};
use flappy_stage::clock::Ticker;
use flappy_stage::config::Settings;
use flappy_stage::game::{Game, GameEvent};
use flappy_stage::input::{Command, command_for};
use flappy_stage::present::Canvas;
use flappy_stage::rng::{Entropy, RandomSource};
use flappy_stage::store::{Account, AccountRepo, AccountScores, HighScoreFile, ScoreStore};
use flappy_stage::tween::Tweens;
use flappy_stage::world::{BIRD_HEIGHT, CANVAS_HEIGHT};
use std::fs::{self, OpenOptions};
use std::io::{Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    action: Option<Action>,

    /// Fixed simulation seed for this session
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the high score on this account instead of the local score file
    #[arg(long)]
    player: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Action {
    /// Print the best accounts
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Create an account
    Register {
        email: String,
        name: String,
        password: String,
        /// Image file stored with the account
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
}

// ── Paths & logging ─────────────────────────────────────────────────────────

struct Paths {
    settings: PathBuf,
    high_score: PathBuf,
    accounts: PathBuf,
    log: PathBuf,
}

fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("io", "flappy-stage", "flappy-stage")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir();
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    Ok(Paths {
        settings: dir.join("settings.json"),
        high_score: dir.join("highscore.txt"),
        accounts: dir.join("accounts.json"),
        log: dir.join("flappy-stage.log"),
    })
}

/// The terminal belongs to the renderer, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────────

fn leaderboard(paths: &Paths, top: usize) {
    let mut repo = AccountRepo::new(&paths.accounts);
    let ranked = repo.get_top_scores(top);
    if ranked.is_empty() {
        println!("No scores yet.");
        return;
    }
    for (rank, account) in ranked.iter().enumerate() {
        println!(
            "{:>3}. {:<20} {:>5}  since {}",
            rank + 1,
            account.name,
            account.high_score,
            account.created_at.format("%Y-%m-%d"),
        );
    }
}

fn register(
    paths: &Paths,
    email: &str,
    name: &str,
    password: &str,
    avatar: Option<&Path>,
) -> Result<()> {
    let mut account = Account::new(email, password, name);
    if let Some(path) = avatar {
        let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        account.set_avatar(&bytes);
    }
    let mut repo = AccountRepo::new(&paths.accounts);
    if !repo.register(account)? {
        bail!("cannot register {email}: invalid details or email already taken");
    }
    info!(email, "account created");
    println!("Registered {email}.");
    Ok(())
}

// ── Game loop ───────────────────────────────────────────────────────────────

/// Loop state that lives outside the simulation.
struct Shell {
    sim: Ticker,
    sprite: Ticker,
    tweens: Tweens,
    audio: Box<dyn AudioSink>,
    volume: f32,
    speed_hint_until: Option<Instant>,
}

impl Shell {
    fn play(&mut self, sound: Sound) {
        self.audio.play(sound, self.volume);
    }

    fn restart_clocks(&mut self) {
        self.sim.reset();
        self.sprite.reset();
    }
}

fn open_audio() -> Box<dyn AudioSink> {
    match Synth::try_new() {
        Ok(synth) => Box::new(synth),
        Err(e) => {
            warn!(error = %e, "no audio output, playing silently");
            Box::new(Silent)
        }
    }
}

/// Applies a command. Returns `false` when the player quits.
fn apply<R: RandomSource, S: ScoreStore>(
    command: Command,
    game: &mut Game<R, S>,
    shell: &mut Shell,
    settings: &mut Settings,
) -> bool {
    let playing = game.session().is_playing;
    match command {
        Command::Quit => return false,
        Command::Jump | Command::Replay if !playing => {
            shell.restart_clocks();
            shell.tweens.clear(false);
            game.start();
            shell.play(Sound::Swoosh);
        }
        Command::Jump => {
            if game.jump() {
                shell.play(Sound::Jump);
            }
        }
        Command::Replay => {}
        Command::Menu => {
            shell.restart_clocks();
            let night = game.is_night();
            shell.tweens.clear(night);
            game.reset_to_menu();
            if night {
                shell.tweens.fade_to_day();
            }
        }
        Command::ToggleDayNight => {
            let night = game.toggle_day_night();
            shell.tweens.fade_sky(night);
            shell.play(Sound::Swoosh);
        }
        Command::SpeedUp | Command::SpeedDown => {
            let steps = if command == Command::SpeedUp { 1.0 } else { -1.0 };
            let speed = settings.nudge_pipe_speed(steps);
            game.set_pipe_speed(speed);
            shell.speed_hint_until = Some(Instant::now() + Duration::from_millis(1500));
            debug!(speed, "pipe speed changed");
        }
    }
    true
}

fn react<R: RandomSource, S: ScoreStore>(event: GameEvent, game: &Game<R, S>, shell: &mut Shell) {
    match event {
        GameEvent::Point { .. } => shell.play(Sound::Point),
        GameEvent::Hit => shell.play(Sound::Hit),
        GameEvent::Died(_) => {
            let bird = game.bird();
            shell
                .tweens
                .fall(bird.y, CANVAS_HEIGHT - BIRD_HEIGHT, bird.rotation);
            shell.play(Sound::Die);
        }
        GameEvent::DayNight { night } => {
            shell.tweens.fade_sky(night);
            shell.play(Sound::Swoosh);
        }
        GameEvent::HazardsSpawned { phase, count } => debug!(phase, count, "hazards incoming"),
        GameEvent::GateSpawned { x } => debug!(x, "gate incoming"),
    }
}

fn run_loop<R: RandomSource, S: ScoreStore>(
    out: &mut impl Write,
    game: &mut Game<R, S>,
    settings: &mut Settings,
) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut canvas = Canvas::new(cols as usize, rows as usize);
    let mut shell = Shell {
        sim: Ticker::new(Duration::from_millis(settings.tick_ms)),
        sprite: Ticker::new(Duration::from_millis(settings.sprite_ms)),
        tweens: Tweens::new(),
        audio: open_audio(),
        volume: settings.volume_gain(),
        speed_hint_until: None,
    };

    let frame_dur = Duration::from_millis(16);
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        let dt = frame_start - last;
        last = frame_start;

        // Input
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(command) = command_for(key) {
                        if !apply(command, game, &mut shell, settings) {
                            return Ok(());
                        }
                    }
                }
                Event::Resize(c, r) => canvas.resize(c as usize, r as usize),
                _ => {}
            }
        }

        // Update
        for _ in 0..shell.sim.advance(dt) {
            for event in game.tick() {
                react(event, game, &mut shell);
            }
        }
        for _ in 0..shell.sprite.advance(dt) {
            game.advance_sprite();
        }
        shell.tweens.advance(dt);

        // Render
        let pose = shell.tweens.death().map(|d| (d.y(), d.rotation()));
        game.project(&mut canvas, pose);
        let hint = shell
            .speed_hint_until
            .filter(|until| *until > frame_start)
            .map(|_| (settings.pipe_speed * 10.0).round() as u32);
        canvas.draw(&game.hud(shell.tweens.night_level(), hint));
        canvas.render(out)?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

fn play<S: ScoreStore>(store: S, seed: Option<u64>, settings: &mut Settings) -> Result<()> {
    let mut game = Game::new(Entropy::new(seed), store, settings.pipe_speed);

    terminal::enable_raw_mode().context("cannot switch terminal to raw mode")?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let result = run_loop(&mut out, &mut game, settings);

    let restored = execute!(
        out,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )
    .and_then(|()| terminal::disable_raw_mode());
    result?;
    restored?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let paths = project_paths()?;
    init_logging(&paths.log)?;

    match args.action {
        Some(Action::Leaderboard { top }) => {
            leaderboard(&paths, top);
            Ok(())
        }
        Some(Action::Register {
            email,
            name,
            password,
            avatar,
        }) => register(&paths, &email, &name, &password, avatar.as_deref()),
        None => {
            let mut settings = Settings::load(&paths.settings);
            let seed = args.seed.or(settings.seed);
            let player = args.player.or_else(|| settings.player.clone());
            info!(?seed, player = player.as_deref(), "session starting");

            let result = match player {
                Some(email) => {
                    let mut repo = AccountRepo::new(&paths.accounts);
                    if repo.get_by_email(&email).is_none() {
                        bail!("no account for {email}; create one with `register` first");
                    }
                    play(AccountScores::new(repo, email), seed, &mut settings)
                }
                None => play(HighScoreFile::new(&paths.high_score), seed, &mut settings),
            };

            if let Err(e) = settings.save(&paths.settings) {
                warn!(error = %e, "settings not saved");
            }
            result
        }
    }
}
