use ratatui::Terminal;
use ratatui::backend::TestBackend;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use showdeck::catalog::{Catalog, Show};
use showdeck::tui::{self, App, LoadState, NO_EPISODES};

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    let mut text = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

fn show(id: u64, name: &str) -> Show {
    Show {
        id,
        name: name.to_string(),
        genres: Vec::new(),
        status: Some("Running".to_string()),
        rating: None,
        runtime: None,
        summary: None,
        image: None,
    }
}

#[tokio::test]
async fn test_show_without_episodes_renders_empty_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shows/42/episodes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = Catalog::with_base_url(&mock_server.uri());
    let mut app = App::new();

    let show_id = app.select_show(show(42, "Quiet Show"));
    let result = catalog.episodes(show_id).await;
    assert!(app.apply_episodes(show_id, result));
    assert_eq!(app.episodes_state, LoadState::Loaded);

    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|f| tui::draw(f, &app)).unwrap();
    let text = screen_text(&terminal);

    assert!(text.contains(NO_EPISODES), "{text}");
    assert!(text.contains("0 / 0"), "{text}");
}

#[tokio::test]
async fn test_episode_cards_render_code_and_placeholder() {
    let mock_server = MockServer::start().await;

    let body = r#"[
        {"id": 10, "season": 1, "number": 1, "name": "Pilot", "summary": "<p>It begins.</p>", "image": null},
        {"id": 11, "season": 1, "number": 2, "name": "Second", "summary": null, "image": null}
    ]"#;

    Mock::given(method("GET"))
        .and(path("/shows/5/episodes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let catalog = Catalog::with_base_url(&mock_server.uri());
    let mut app = App::new();

    let show_id = app.select_show(show(5, "Busy Show"));
    let result = catalog.episodes(show_id).await;
    app.apply_episodes(show_id, result);

    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|f| tui::draw(f, &app)).unwrap();
    let text = screen_text(&terminal);

    assert!(text.contains("Pilot - S01E01"), "{text}");
    assert!(text.contains("It begins."), "{text}");
    assert!(text.contains("No summary for this episode."), "{text}");
    assert!(text.contains("Displaying 2 / 2 episodes"), "{text}");

    // Searching narrows the list and the count
    app.push_search_char('s');
    app.push_search_char('e');
    app.push_search_char('c');
    terminal.draw(|f| tui::draw(f, &app)).unwrap();
    let text = screen_text(&terminal);

    assert!(text.contains("Displaying 1 / 2 episodes"), "{text}");
    assert!(!text.contains("Pilot - S01E01"), "{text}");
}

#[tokio::test]
async fn test_failed_show_list_renders_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shows"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let catalog = Catalog::with_base_url(&mock_server.uri());
    let mut app = App::new();

    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|f| tui::draw(f, &app)).unwrap();
    assert!(screen_text(&terminal).contains("Loading..."));

    app.apply_shows(catalog.shows().await);
    terminal.draw(|f| tui::draw(f, &app)).unwrap();
    let text = screen_text(&terminal);

    assert!(text.contains("Failed to load shows."), "{text}");
    assert!(text.contains("Displaying 0 / 0 shows"), "{text}");
}
