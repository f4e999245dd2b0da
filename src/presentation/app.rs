//! Command-line front end wiring the gallery together.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, eyre};
use image::DynamicImage;
use sha2::{Digest, Sha256};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::application::services::{
    ForegroundAwareNotifier, GalleryPager, PollScheduler, PollingController, VisibilityHandle,
};
use crate::application::use_cases::{PollCoordinator, PollOutcome};
use crate::domain::entities::{GalleryItem, Preferences};
use crate::domain::ports::{ConnectivityPort, NotificationPort, PreferencesPort};
use crate::infrastructure::config::{AppConfig, Command, PollingSwitch};
use crate::infrastructure::image::{Dispatch, FetchWorker, FetchWorkerConfig, ImageCache};
use crate::infrastructure::{
    DEFAULT_PROBE_TIMEOUT, DesktopNotificationService, FlickrClient, HttpConnectivityProbe,
    PreferenceStore,
};
use crate::presentation::slot_binding::{SlotBinding, SlotContent};

const THUMBNAIL_NAME_BYTES: usize = 16;
const SETTLE_GRACE: Duration = Duration::from_secs(5);

/// Name of the PNG file a thumbnail for `url` is written to.
#[must_use]
pub fn thumbnail_file_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{}.png", hex::encode(&digest[..THUMBNAIL_NAME_BYTES]))
}

pub struct App {
    config: AppConfig,
    client: Arc<FlickrClient>,
    preferences: Arc<dyn PreferencesPort>,
    cache: Arc<ImageCache>,
    coordinator: Arc<PollCoordinator>,
    visibility: VisibilityHandle,
}

impl App {
    /// Builds the application from configuration.
    ///
    /// # Errors
    /// Returns error if no API key is configured or an HTTP client cannot be
    /// created.
    pub fn new(config: AppConfig, preferences_path: PathBuf) -> Result<Self> {
        let api_key = config
            .api
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| eyre!("No API key configured; set FLICKR_API_KEY or [api].api_key"))?;

        let client = Arc::new(
            FlickrClient::with_base_url(&config.api.base_url, api_key, config.api.timeout())
                .wrap_err("Failed to create photo service client")?,
        );
        let connectivity: Arc<dyn ConnectivityPort> = Arc::new(
            HttpConnectivityProbe::new(&config.api.base_url, DEFAULT_PROBE_TIMEOUT)
                .wrap_err("Failed to create connectivity probe")?,
        );
        let preferences: Arc<dyn PreferencesPort> =
            Arc::new(PreferenceStore::new(preferences_path));

        let visibility = VisibilityHandle::new();
        let notifier: Arc<dyn NotificationPort> = Arc::new(ForegroundAwareNotifier::new(
            Arc::new(DesktopNotificationService::new(config.notifications.enabled)),
            visibility.clone(),
        ));

        let coordinator = Arc::new(PollCoordinator::new(
            client.clone(),
            preferences.clone(),
            connectivity,
            notifier,
        ));

        let cache = Arc::new(ImageCache::from_memory_budget(
            config.cache.budget_bytes(),
            config.cache.memory_fraction,
        ));

        Ok(Self {
            config,
            client,
            preferences,
            cache,
            coordinator,
            visibility,
        })
    }

    /// Runs one CLI command to completion.
    ///
    /// # Errors
    /// Returns error if preferences or output files cannot be accessed.
    pub async fn run(&self, command: Command) -> Result<()> {
        debug!(?command, "Running command");
        match command {
            Command::List { page } => self.list(page).await,
            Command::Search { query, page } => self.search(&query, page).await,
            Command::ClearSearch => self.clear_search().await,
            Command::Thumbnails { page, slots, out } => self.thumbnails(page, slots, &out).await,
            Command::Poll { once } => self.poll(once).await,
            Command::Polling { switch } => self.polling(switch).await,
        }
    }

    async fn load_preferences(&self) -> Result<Preferences> {
        self.preferences
            .load()
            .await
            .wrap_err("Failed to read preferences")
    }

    async fn store_pager(&self, pager: &GalleryPager, mut preferences: Preferences) -> Result<()> {
        pager.write_to(&mut preferences.poll);
        self.preferences
            .save(&preferences)
            .await
            .wrap_err("Failed to store preferences")
    }

    async fn list(&self, page: Option<u32>) -> Result<()> {
        let preferences = self.load_preferences().await?;
        let mut pager = GalleryPager::from_state(&preferences.poll);
        pager.go_to_page(page.unwrap_or_else(|| preferences.poll.effective_page()));

        pager.reload(self.client.as_ref()).await;
        print_items(&pager);
        self.store_pager(&pager, preferences).await
    }

    async fn search(&self, query: &str, page: u32) -> Result<()> {
        let preferences = self.load_preferences().await?;
        let mut pager = GalleryPager::from_state(&preferences.poll);
        pager.submit_query(query);
        pager.go_to_page(page);

        pager.reload(self.client.as_ref()).await;
        print_items(&pager);
        self.store_pager(&pager, preferences).await
    }

    async fn clear_search(&self) -> Result<()> {
        let preferences = self.load_preferences().await?;
        let mut pager = GalleryPager::from_state(&preferences.poll);
        pager.clear_query();
        self.store_pager(&pager, preferences).await?;
        println!("Search cleared; listing recent photos.");
        Ok(())
    }

    fn polling_controller(&self) -> PollingController {
        PollingController::new(
            PollScheduler::new(
                self.config.poll.interval(),
                self.config.poll.cycle_timeout(),
            ),
            self.coordinator.clone(),
            self.preferences.clone(),
        )
    }

    /// Pushes a page through `slot_count` recycled slots, a window at a time,
    /// writing every delivered thumbnail to `out`.
    async fn thumbnails(&self, page: Option<u32>, slot_count: usize, out: &Path) -> Result<()> {
        let slot_count = slot_count.max(1);
        let preferences = self.load_preferences().await?;
        let mut pager = GalleryPager::from_state(&preferences.poll);
        pager.go_to_page(page.unwrap_or_else(|| preferences.poll.effective_page()));
        pager.reload(self.client.as_ref()).await;

        tokio::fs::create_dir_all(out)
            .await
            .wrap_err_with(|| format!("Failed to create {}", out.display()))?;

        self.visibility.set_visible(true);
        let controller = self.polling_controller();
        if let Err(e) = controller.restore().await {
            warn!(error = %e, "Could not restore background polling");
        }

        let mut worker = FetchWorker::new(
            self.client.clone(),
            self.cache.clone(),
            FetchWorkerConfig::default(),
        );
        let binding = SlotBinding::new();
        binding.attach(&mut worker);

        let settle = self.config.api.timeout() + SETTLE_GRACE;
        let mut written = 0;
        for window in pager.items().chunks(slot_count) {
            for (slot, item) in window.iter().enumerate() {
                binding.bind(&worker, slot, item);
            }
            for slot in window.len()..slot_count {
                binding.recycle(&worker, &slot);
            }

            // One outcome per queued job, failures included.
            let mut outstanding = window
                .iter()
                .filter(|item| item.thumbnail_url().is_some_and(|url| !url.is_empty()))
                .count();
            while outstanding > 0 {
                match timeout(settle, worker.dispatch_next()).await {
                    Ok(Dispatch::Closed) => break,
                    Ok(_) => outstanding -= 1,
                    Err(_) => {
                        warn!(outstanding, "Thumbnails did not arrive in time, moving on");
                        break;
                    }
                }
            }

            for slot in 0..window.len() {
                if let (Some(item), Some(SlotContent::Thumbnail(image))) =
                    (binding.item(&slot), binding.content(&slot))
                {
                    write_thumbnail(out, &item, image).await?;
                    written += 1;
                }
            }
        }

        worker.shutdown().await;
        controller.stop();
        self.visibility.set_visible(false);

        info!(written, listed = pager.items().len(), "Thumbnails written");
        println!(
            "Wrote {written} of {} thumbnails to {}",
            pager.items().len(),
            out.display()
        );
        println!("{}", self.cache.stats());
        Ok(())
    }

    async fn poll(&self, once: bool) -> Result<()> {
        if once {
            print_outcome(&self.coordinator.run_cycle().await);
            return Ok(());
        }

        let controller = self.polling_controller();
        if !controller.restore().await? {
            println!("Polling is off. Enable it with `photogallery polling on`.");
            return Ok(());
        }
        self.wait_for_interrupt(&controller).await
    }

    async fn polling(&self, switch: PollingSwitch) -> Result<()> {
        let controller = self.polling_controller();
        match switch {
            PollingSwitch::On => {
                controller.set_enabled(true).await?;
                println!("Polling enabled.");
                self.wait_for_interrupt(&controller).await
            }
            PollingSwitch::Off => {
                controller.set_enabled(false).await?;
                println!("Polling disabled.");
                Ok(())
            }
            PollingSwitch::Status => {
                let preferences = self.load_preferences().await?;
                let state = if preferences.polling_enabled {
                    "on"
                } else {
                    "off"
                };
                println!("Polling is {state}.");
                if let Some(id) = preferences.poll.last_result_id {
                    println!("Last seen result: {id}");
                }
                Ok(())
            }
        }
    }

    async fn wait_for_interrupt(&self, controller: &PollingController) -> Result<()> {
        println!(
            "Checking for new photos every {}s; press Ctrl-C to stop.",
            self.config.poll.interval_secs
        );
        tokio::signal::ctrl_c()
            .await
            .wrap_err("Failed to listen for Ctrl-C")?;
        controller.stop();
        Ok(())
    }
}

async fn write_thumbnail(out: &Path, item: &GalleryItem, image: Arc<DynamicImage>) -> Result<()> {
    let Some(url) = item.thumbnail_url() else {
        return Ok(());
    };
    let path = out.join(thumbnail_file_name(url));
    let target = path.clone();

    tokio::task::spawn_blocking(move || image.save_with_format(&target, image::ImageFormat::Png))
        .await
        .wrap_err("Thumbnail writer panicked")?
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

    debug!(id = item.id(), path = %path.display(), "Wrote thumbnail");
    Ok(())
}

fn print_items(pager: &GalleryPager) {
    let scope = pager.query().map_or_else(
        || "recent photos".to_string(),
        |query| format!("\"{query}\""),
    );
    println!(
        "Page {} of {scope}: {} items",
        pager.current_page(),
        pager.items().len()
    );
    for item in pager.items() {
        println!("{item}\t{}", item.thumbnail_url().unwrap_or_default());
    }
}

fn print_outcome(outcome: &PollOutcome) {
    match outcome {
        PollOutcome::Offline => println!("Offline; skipped."),
        PollOutcome::StateUnavailable => println!("Preferences unavailable; skipped."),
        PollOutcome::NoResults => println!("No results."),
        PollOutcome::Unchanged { result_id } => println!("Got an old result: {result_id}"),
        PollOutcome::NewContent(event) => {
            println!("{}: {} (newest {})", event.title(), event.body(), event.result_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::png_bytes;
    use mockito::{Matcher, Server};
    use tempfile::tempdir;

    fn listing(server: &Server, count: usize) -> String {
        let photos: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"id": "{i}", "title": "photo {i}", "url_s": "{}/img/{i}.png"}}"#,
                    server.url()
                )
            })
            .collect();
        format!(
            r#"{{"photos": {{"page": 1, "pages": 1, "perpage": 100, "photo": [{}]}}, "stat": "ok"}}"#,
            photos.join(",")
        )
    }

    fn app_for(server: &Server, dir: &Path) -> App {
        let mut config = AppConfig::default();
        config.api.base_url = format!("{}/services/rest/", server.url());
        config.api.api_key = Some("test-key".to_string());
        config.notifications.enabled = false;
        App::new(config, dir.join("preferences.toml")).unwrap()
    }

    #[test]
    fn test_thumbnail_file_name() {
        let name = thumbnail_file_name("https://live.example/1_s.jpg");
        assert_eq!(name.len(), THUMBNAIL_NAME_BYTES * 2 + 4);
        assert!(name.ends_with(".png"));
        assert_eq!(name, thumbnail_file_name("https://live.example/1_s.jpg"));
        assert_ne!(name, thumbnail_file_name("https://live.example/2_s.jpg"));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let dir = tempdir().unwrap();
        let result = App::new(AppConfig::default(), dir.path().join("preferences.toml"));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_search_stores_query_for_list() {
        let mut server = Server::new_async().await;
        let body = listing(&server, 2);
        let search = server
            .mock("GET", "/services/rest/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("method".into(), "flickr.photos.search".into()),
                Matcher::UrlEncoded("text".into(), "kestrel".into()),
            ]))
            .with_body(&body)
            .expect(2)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let app = app_for(&server, dir.path());

        app.run(Command::Search {
            query: "kestrel".to_string(),
            page: 1,
        })
        .await
        .unwrap();
        app.run(Command::List { page: None }).await.unwrap();

        search.assert_async().await;
        let stored = app.preferences.load().await.unwrap();
        assert_eq!(stored.poll.stored_query.as_deref(), Some("kestrel"));
        assert_eq!(stored.poll.current_page, 1);

        app.run(Command::ClearSearch).await.unwrap();
        assert!(app.preferences.load().await.unwrap().poll.stored_query.is_none());
    }

    #[tokio::test]
    async fn test_thumbnails_written_through_recycled_slots() {
        let mut server = Server::new_async().await;
        let body = listing(&server, 3);
        let _listing = server
            .mock("GET", "/services/rest/")
            .match_query(Matcher::Any)
            .with_body(&body)
            .create_async()
            .await;
        let png = png_bytes(6, 4);
        let mut _images = Vec::new();
        for i in 0..3 {
            _images.push(
                server
                    .mock("GET", format!("/img/{i}.png").as_str())
                    .with_body(png.to_vec())
                    .create_async()
                    .await,
            );
        }

        let dir = tempdir().unwrap();
        let out = dir.path().join("thumbs");
        let app = app_for(&server, dir.path());

        app.run(Command::Thumbnails {
            page: Some(1),
            slots: 2,
            out: out.clone(),
        })
        .await
        .unwrap();

        let expected = thumbnail_file_name(&format!("{}/img/2.png", server.url()));
        assert!(out.join(expected).exists());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 3);
        assert_eq!(app.cache.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_thumbnail_does_not_stall_window() {
        let mut server = Server::new_async().await;
        let body = listing(&server, 2);
        let _listing = server
            .mock("GET", "/services/rest/")
            .match_query(Matcher::Any)
            .with_body(&body)
            .create_async()
            .await;
        let _found = server
            .mock("GET", "/img/0.png")
            .with_body(png_bytes(6, 4).to_vec())
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/img/1.png")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let out = dir.path().join("thumbs");
        let mut config = AppConfig::default();
        config.api.base_url = format!("{}/services/rest/", server.url());
        config.api.api_key = Some("test-key".to_string());
        config.api.timeout_secs = 1;
        config.notifications.enabled = false;
        let app = App::new(config, dir.path().join("preferences.toml")).unwrap();

        let started = std::time::Instant::now();
        app.run(Command::Thumbnails {
            page: Some(1),
            slots: 2,
            out: out.clone(),
        })
        .await
        .unwrap();

        assert!(started.elapsed() < SETTLE_GRACE);
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
        assert_eq!(app.cache.len(), 1);
    }
}
