use actix_web::{middleware, web, App, HttpServer};

use servo_panel::controller::ServoController;

const BIND_HOST: &str = "127.0.0.1";
const BIND_PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let controller = web::Data::new(ServoController::new());

    let panel_url = format!("http://{}:{}", BIND_HOST, BIND_PORT);
    log::info!("Servo panel listening on {}", panel_url);

    if let Err(e) = webbrowser::open(&panel_url) {
        log::warn!("Could not open browser: {}", e);
    }

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(controller.clone())
            .configure(servo_panel::web::configure)
    })
    // One serial link, one session; a single worker keeps request
    // handling serialized the same way the controller mutex does.
    .workers(1)
    .bind((BIND_HOST, BIND_PORT))?
    .run()
    .await?;

    Ok(())
}
