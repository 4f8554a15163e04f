use ratatui::Frame;

use super::{game::GameView, home::HomeView, leaderboard::LeaderboardView, lobby::LobbyView};
use crate::{App, Page};

/// A UI Screen boundary: renders one page of the app
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

pub struct HomeScreen;

impl Screen for HomeScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(HomeView(app), f.area());
    }
}

pub struct LobbyScreen;

impl Screen for LobbyScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(LobbyView(app), f.area());
    }
}

/// Game screen; the arena carries its own room id
pub struct GameScreen;

impl Screen for GameScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(GameView(app), f.area());
    }
}

pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(LeaderboardView(app), f.area());
    }
}

/// Helper to construct the appropriate screen for the current page
pub fn current_screen(page: &Page) -> Box<dyn Screen> {
    match page {
        Page::Home => Box::new(HomeScreen),
        Page::Lobby => Box::new(LobbyScreen),
        Page::Game { .. } => Box::new(GameScreen),
        Page::Leaderboard => Box::new(LeaderboardScreen),
    }
}
