mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, SystemTime},
};
use tracing::{info, warn};
use typearena::{
    app_dirs::AppDirs,
    arena::{Arena, MatchStatus},
    chain::{client_for, Backend, Operation, WalletInfo},
    config::{Config, ConfigStore, FileConfigStore},
    leaderboard::LeaderboardEntry,
    logging,
    room::{filter_open_rooms, new_room_id, Room, RoomSettings, MAX_ROUNDS, MIN_ROUNDS},
    runtime::{ArenaEvent, ArenaEventSource, CrosstermEventSource, FixedTicker, Runner},
    session::{ChainSession, ConnectionState},
    worker::{ChainReply, ChainRequest, ChainWorker},
};

const TICK_RATE_MS: u64 = 100;
const DEFAULT_ROUNDS: u8 = 3;

/// real-time multiplayer typing races in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Race other typists in rooms hosted on a Linera application chain, or offline against a simulated chain. Rooms, results and the leaderboard live on chain; the terminal only renders and relays."
)]
pub struct Cli {
    /// display name used in rooms
    #[clap(short = 'p', long)]
    player: Option<String>,

    /// chain backend to talk to
    #[clap(short = 'b', long, value_enum)]
    backend: Option<Backend>,

    /// node service URL the remote backend relays to
    #[clap(long)]
    node_url: Option<String>,

    /// arena application id
    #[clap(long)]
    app_id: Option<String>,

    /// chain to act on instead of the node's default chain
    #[clap(long)]
    chain_id: Option<String>,

    /// rounds per match when opening a room with --room
    #[clap(short = 'r', long, default_value_t = DEFAULT_ROUNDS, value_parser = clap::value_parser!(u8).range(MIN_ROUNDS as i64..=MAX_ROUNDS as i64))]
    rounds: u8,

    /// go straight to the game page of this room
    #[clap(long)]
    room: Option<String>,
}

impl Cli {
    /// Flags win over the file and the environment
    fn apply(&self, mut config: Config) -> Config {
        if let Some(player) = &self.player {
            config.player_name = player.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(url) = &self.node_url {
            config.node_url = url.clone();
        }
        if let Some(app_id) = &self.app_id {
            config.app_id = app_id.clone();
        }
        if let Some(chain_id) = &self.chain_id {
            config.chain_id = Some(chain_id.clone());
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Home,
    Lobby,
    Game { room_id: String },
    Leaderboard,
}

#[derive(Debug, Default)]
pub struct LobbyState {
    pub rooms: Vec<Room>,
    pub selected: usize,
    pub query: String,
    pub searching: bool,
    /// Open create-room form
    pub form: Option<RoomSettings>,
    pub loading: bool,
}

#[derive(Debug, Default)]
pub struct BoardState {
    pub entries: Vec<LeaderboardEntry>,
    pub loading: bool,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub page: Page,
    pub connection: ConnectionState,
    pub lobby: LobbyState,
    pub board: BoardState,
    pub arena: Option<Arena>,
    /// Room we asked the chain to create or join, with its round count
    pub pending_room: Option<(String, u8)>,
    /// `pending_room` still needs its join sent once a wallet is connected
    join_on_connect: bool,
    pub error: Option<String>,
    /// Clock reading of the last event, used for rendering
    pub now: SystemTime,
    pub should_quit: bool,
    outbox: Vec<ChainRequest>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let mut app = Self {
            config,
            page: Page::Home,
            connection: ConnectionState::Disconnected,
            lobby: LobbyState::default(),
            board: BoardState::default(),
            arena: None,
            pending_room: None,
            join_on_connect: false,
            error: None,
            now: SystemTime::now(),
            should_quit: false,
            outbox: Vec::new(),
        };
        app.connect();
        app
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionState::Connected(_))
    }

    pub fn wallet(&self) -> Option<&WalletInfo> {
        match &self.connection {
            ConnectionState::Connected(w) => Some(w),
            _ => None,
        }
    }

    /// Requests queued since the last call, in order
    pub fn take_requests(&mut self) -> Vec<ChainRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Open rooms matching the search box
    pub fn visible_rooms(&self) -> Vec<&Room> {
        filter_open_rooms(&self.lobby.rooms, &self.lobby.query)
    }

    fn connect(&mut self) {
        if self.connection == ConnectionState::Disconnected {
            self.connection = ConnectionState::Connecting;
            self.error = None;
            self.outbox.push(ChainRequest::Connect);
        }
    }

    fn disconnect(&mut self) {
        if self.is_connected() {
            self.outbox.push(ChainRequest::Disconnect);
        }
    }

    fn host_chain_id(&self) -> String {
        self.wallet().map(|w| w.chain_id.clone()).unwrap_or_default()
    }

    pub fn open_lobby(&mut self) {
        self.page = Page::Lobby;
        self.refresh_rooms();
    }

    pub fn open_leaderboard(&mut self) {
        self.page = Page::Leaderboard;
        self.refresh_leaderboard();
    }

    fn refresh_rooms(&mut self) {
        if self.is_connected() {
            self.lobby.loading = true;
            self.outbox.push(ChainRequest::FetchRooms);
        }
    }

    fn refresh_leaderboard(&mut self) {
        if self.is_connected() {
            self.board.loading = true;
            self.outbox.push(ChainRequest::FetchLeaderboard);
        }
    }

    /// Join a room by id, as `--room` does. The game page opens once the
    /// chain accepts the join; until a wallet is connected the join waits.
    pub fn open_room(&mut self, room_id: String, rounds: u8) {
        self.pending_room = Some((room_id, rounds));
        if self.is_connected() {
            self.send_pending_join();
        } else {
            self.join_on_connect = true;
        }
    }

    fn send_pending_join(&mut self) {
        self.join_on_connect = false;
        let Some((room_id, _)) = self.pending_room.clone() else {
            return;
        };
        self.outbox.push(ChainRequest::Execute(Operation::JoinRoom {
            room_id,
            host_chain_id: self.host_chain_id(),
            player_name: self.config.player_name.clone(),
        }));
    }

    pub fn enter_game(&mut self, room_id: String, rounds: u8) {
        info!(room = %room_id, rounds, "entering game");
        self.arena = Some(Arena::new(room_id.clone(), &self.config.player_name, rounds));
        self.page = Page::Game { room_id };
    }

    fn leave_game(&mut self) {
        if let Some(arena) = self.arena.take() {
            if self.is_connected() {
                self.outbox.push(ChainRequest::Execute(Operation::LeaveRoom {
                    room_id: arena.room_id().to_string(),
                    host_chain_id: self.host_chain_id(),
                }));
            }
        }
        self.open_lobby();
    }

    fn create_room(&mut self, settings: RoomSettings) {
        if !self.is_connected() {
            self.connect();
            return;
        }
        if let Err(e) = settings.validate() {
            self.error = Some(e.to_string());
            return;
        }

        let room_id = new_room_id(chrono::Utc::now().timestamp_millis(), &mut rand::thread_rng());
        self.join_on_connect = false;
        self.pending_room = Some((room_id.clone(), settings.rounds));
        self.outbox.push(ChainRequest::Execute(Operation::CreateRoom {
            room_id,
            max_players: settings.max_players,
            rounds: settings.rounds,
        }));
    }

    fn join_selected(&mut self) {
        if !self.is_connected() {
            self.connect();
            return;
        }
        let Some(room) = self.visible_rooms().get(self.lobby.selected).map(|r| (*r).clone()) else {
            return;
        };

        self.pending_room = Some((room.id, room.rounds));
        self.send_pending_join();
    }

    fn submit_result(&mut self) {
        if !self.is_connected() {
            return;
        }
        let Some(arena) = &self.arena else {
            return;
        };
        let stats = arena.local_player().stats();
        let time_ms = match (arena.started_at(), arena.ended_at()) {
            (Some(start), Some(end)) => end.duration_since(start).unwrap_or_default().as_millis() as u64,
            _ => 0,
        };
        let operation = Operation::SubmitResult {
            room_id: arena.room_id().to_string(),
            host_chain_id: self.host_chain_id(),
            wpm: stats.wpm,
            accuracy: stats.accuracy,
            time_ms,
        };
        self.outbox.push(ChainRequest::Execute(operation));
    }

    pub fn on_tick(&mut self, now: SystemTime) {
        self.now = now;
        if let Some(arena) = self.arena.as_mut() {
            arena.on_tick(now);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, now: SystemTime) {
        self.now = now;

        // ctrl+c quits from anywhere, including mid-round
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.page {
            Page::Home => self.on_home_key(key),
            Page::Lobby => self.on_lobby_key(key),
            Page::Game { .. } => self.on_game_key(key, now),
            Page::Leaderboard => self.on_leaderboard_key(key),
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('l') => self.open_lobby(),
            KeyCode::Char('b') => self.open_leaderboard(),
            KeyCode::Char('c') => self.connect(),
            KeyCode::Char('d') => self.disconnect(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn on_lobby_key(&mut self, key: KeyEvent) {
        if self.lobby.searching {
            match key.code {
                KeyCode::Char(c) => self.lobby.query.push(c),
                KeyCode::Backspace => {
                    self.lobby.query.pop();
                }
                KeyCode::Enter | KeyCode::Esc => self.lobby.searching = false,
                _ => {}
            }
            self.lobby.selected = 0;
            return;
        }

        if let Some(mut form) = self.lobby.form {
            match key.code {
                KeyCode::Char('p') => form.cycle_players(),
                KeyCode::Char('n') => form.cycle_rounds(),
                KeyCode::Enter => {
                    self.lobby.form = None;
                    self.create_room(form);
                    return;
                }
                KeyCode::Esc => {
                    self.lobby.form = None;
                    return;
                }
                _ => {}
            }
            self.lobby.form = Some(form);
            return;
        }

        match key.code {
            KeyCode::Char('r') => self.refresh_rooms(),
            KeyCode::Char('c') => self.lobby.form = Some(RoomSettings::default()),
            KeyCode::Char('/') => self.lobby.searching = true,
            KeyCode::Char('j') | KeyCode::Enter => self.join_selected(),
            KeyCode::Up => self.lobby.selected = self.lobby.selected.saturating_sub(1),
            KeyCode::Down => {
                let last = self.visible_rooms().len().saturating_sub(1);
                self.lobby.selected = (self.lobby.selected + 1).min(last);
            }
            KeyCode::Esc | KeyCode::Char('h') => self.page = Page::Home,
            _ => {}
        }
    }

    fn on_game_key(&mut self, key: KeyEvent, now: SystemTime) {
        if key.code == KeyCode::Esc {
            self.leave_game();
            return;
        }

        let mut finished = false;
        if let Some(arena) = self.arena.as_mut() {
            match key.code {
                KeyCode::Enter => {
                    if arena.status() == MatchStatus::Finished {
                        arena.replay(now);
                    } else {
                        arena.start(now);
                    }
                }
                KeyCode::Backspace => arena.backspace(),
                KeyCode::Char(c) => {
                    let was_playing = arena.status() == MatchStatus::Playing;
                    arena.write(c, now);
                    finished = was_playing && arena.status() == MatchStatus::Finished;
                }
                _ => {}
            }
        }

        if finished {
            self.submit_result();
        }
    }

    fn on_leaderboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => self.refresh_leaderboard(),
            KeyCode::Esc | KeyCode::Char('h') => self.page = Page::Home,
            _ => {}
        }
    }

    pub fn on_reply(&mut self, reply: ChainReply) {
        match reply {
            ChainReply::Connected(Ok(wallet)) => {
                self.connection = ConnectionState::Connected(wallet);
                self.error = None;
                if self.join_on_connect {
                    self.send_pending_join();
                }
                match self.page {
                    Page::Lobby => self.refresh_rooms(),
                    Page::Leaderboard => self.refresh_leaderboard(),
                    _ => {}
                }
            }
            ChainReply::Connected(Err(e)) => {
                self.connection = ConnectionState::Disconnected;
                self.error = Some(e);
            }
            ChainReply::Disconnected => {
                self.connection = ConnectionState::Disconnected;
                self.error = None;
            }
            ChainReply::Rooms(result) => {
                self.lobby.loading = false;
                match result {
                    Ok(rooms) => {
                        self.lobby.rooms = rooms;
                        let last = self.visible_rooms().len().saturating_sub(1);
                        self.lobby.selected = self.lobby.selected.min(last);
                    }
                    Err(e) => self.error = Some(e),
                }
            }
            ChainReply::Leaderboard(result) => {
                self.board.loading = false;
                match result {
                    Ok(entries) => self.board.entries = entries,
                    Err(e) => self.error = Some(e),
                }
            }
            ChainReply::Executed { operation, result } => {
                let pending = self
                    .pending_room
                    .as_ref()
                    .is_some_and(|(id, _)| id == operation.room_id());
                match result {
                    Ok(_) => {
                        if pending {
                            if let Some((room_id, rounds)) = self.pending_room.take() {
                                self.enter_game(room_id, rounds);
                            }
                        }
                    }
                    Err(e) => {
                        if pending {
                            self.pending_room = None;
                        }
                        self.error = Some(e);
                    }
                }
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = cli.apply(FileConfigStore::new().load().from_process_env()?);

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init_file_logging(&path) {
            eprintln!("logging disabled: {e}");
        }
    }
    info!(backend = %config.backend, node_url = %config.node_url, "starting typearena");

    let events = CrosstermEventSource::new();
    let replies = events.sender();
    let session = ChainSession::new(client_for(&config), config.app_id.clone());
    let worker = ChainWorker::spawn(session, move |reply| {
        let _ = replies.send(ArenaEvent::Chain(reply));
    });
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    let mut app = App::new(config);
    if let Some(room) = cli.room.clone() {
        app.open_room(room, cli.rounds);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner, &worker);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B, E>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, FixedTicker>,
    worker: &ChainWorker,
) -> Result<(), Box<dyn Error>>
where
    B: ratatui::backend::Backend,
    E: ArenaEventSource,
{
    loop {
        for request in app.take_requests() {
            if !worker.request(request) {
                warn!("chain worker has stopped");
            }
        }

        terminal.draw(|f| ui::draw(app, f))?;
        if app.should_quit {
            break;
        }

        match runner.step() {
            ArenaEvent::Tick => app.on_tick(SystemTime::now()),
            ArenaEvent::Resize => {}
            ArenaEvent::Key(key) => app.on_key(key, SystemTime::now()),
            ArenaEvent::Chain(reply) => app.on_reply(reply),
        }
    }

    info!("exiting");
    Ok(())
}
