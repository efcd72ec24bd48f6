#[cfg(test)]
use crate::core::app::{App, AppInitConfig};
#[cfg(test)]
use crate::core::connection::ConnectionId;
#[cfg(test)]
use crate::core::personality::default_personality;
#[cfg(test)]
use crate::core::protocol::InboundFormat;

#[cfg(test)]
pub fn create_test_app() -> App {
    App::new(AppInitConfig {
        personality: default_personality(),
        inbound_format: InboundFormat::Raw,
        log_file: None,
    })
    .expect("test app")
}

/// An app that finished onboarding as Ana, 25, interested in music.
#[cfg(test)]
pub fn create_chat_app() -> App {
    let mut app = create_test_app();
    let onboarding = app.onboarding_mut().expect("fresh app starts onboarding");
    onboarding.set_current_input("Ana");
    assert!(onboarding.advance());
    onboarding.set_current_input("25");
    assert!(onboarding.advance());
    assert!(onboarding.add_interest(Some("music")));
    app.complete_onboarding().expect("open connection command");
    app
}

#[cfg(test)]
pub fn mark_ready(app: &mut App, conn_id: ConnectionId) {
    app.connection_opened(conn_id);
    app.on_connection_ready();
}
