use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::time::Instant;

use eframe::egui;
use lru::LruCache;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::map::base_layer::BaseLayerId;
use crate::map::map::{Map, MapOutput};
use crate::map::map_tile::{MapTile, TileKey};
use crate::maps_api::asset_loader::AssetLoader;
use crate::maps_api::failures::{FailedFetches, RETRY_AFTER};
use crate::maps_api::tile_retriever::TileRetriever;
use crate::maps_api::{http_client, DecodedImage, FetchError};
use crate::screen::HomeScreen;

use super::layer_control::{attribution, layer_control, zoom_buttons};
use super::theme;

/// Marker image, relative to the asset directory.
pub const MARKER_ICON: &str = "icon/icon_map.png";

/// Upper bound on tile requests in flight; the rest wait for later frames.
const MAX_TILES_IN_FLIGHT: usize = 16;

const IMAGE_CACHE_SIZE: usize = 32;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot start the fetch runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] FetchError),
}

/// Results coming back from the fetch runtime.
enum Fetched {
    Tile(TileKey, Result<MapTile, FetchError>),
    Image(String, Result<DecodedImage, FetchError>),
}

pub struct HomeApp {
    screen: HomeScreen,
    tile_cache: LruCache<TileKey, MapTile>,
    pending_tiles: HashSet<TileKey>,
    failed_tiles: FailedFetches<TileKey>,
    // Layer the failures above were recorded against.
    tile_layer: BaseLayerId,
    images: LruCache<String, egui::TextureHandle>,
    pending_images: HashSet<String>,
    failed_images: FailedFetches<String>,
    tile_retriever: TileRetriever,
    asset_loader: AssetLoader,
    sender: mpsc::UnboundedSender<Fetched>,
    receiver: mpsc::UnboundedReceiver<Fetched>,
    runtime: tokio::runtime::Runtime,
}

impl HomeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Result<Self, StartupError> {
        cc.egui_ctx.set_style(theme::dark_style(&cc.egui_ctx));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .thread_name("map-fetcher")
            .enable_all()
            .build()?;
        let client = http_client(&config.user_agent)?;
        let (sender, receiver) = mpsc::unbounded_channel();

        log::info!(
            "assets from {}, tile cache of {} tiles",
            config.asset_dir.display(),
            config.tile_cache_capacity
        );

        Ok(Self {
            screen: HomeScreen::new(config.default_layer),
            tile_cache: LruCache::new(config.tile_cache_capacity),
            pending_tiles: HashSet::new(),
            failed_tiles: FailedFetches::default(),
            tile_layer: config.default_layer,
            images: LruCache::new(NonZeroUsize::new(IMAGE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN)),
            pending_images: HashSet::new(),
            failed_images: FailedFetches::default(),
            tile_retriever: TileRetriever::new(client.clone()),
            asset_loader: AssetLoader::new(client, config.asset_dir),
            sender,
            receiver,
            runtime,
        })
    }

    fn receive_fetched(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.failed_tiles.prune(now);
        self.failed_images.prune(now);

        while let Ok(fetched) = self.receiver.try_recv() {
            match fetched {
                Fetched::Tile(key, Ok(tile)) => {
                    self.pending_tiles.remove(&key);
                    self.tile_cache.put(key, tile);
                }
                Fetched::Tile(key, Err(e)) => {
                    log::warn!("tile {:?} of {} failed: {}", key.1, key.0, e);
                    self.pending_tiles.remove(&key);
                    self.failed_tiles.mark_failed(key, now);
                    ctx.request_repaint_after(RETRY_AFTER);
                }
                Fetched::Image(reference, Ok(image)) => {
                    let texture = ctx.load_texture(
                        format!("asset:{}", reference),
                        image.to_color_image(),
                        egui::TextureOptions::LINEAR,
                    );
                    self.pending_images.remove(&reference);
                    self.images.put(reference, texture);
                }
                Fetched::Image(reference, Err(e)) => {
                    log::warn!("image {} failed: {}", reference, e);
                    self.pending_images.remove(&reference);
                    self.failed_images.mark_failed(reference, now);
                    ctx.request_repaint_after(RETRY_AFTER);
                }
            }
        }
    }

    fn request_tiles(&mut self, ctx: &egui::Context, missing: Vec<TileKey>) {
        let layer = self.screen.map().base_layer();
        if layer != self.tile_layer {
            // Switching back to a layer retries whatever failed on it earlier.
            self.failed_tiles.retain(|(failed_layer, _)| *failed_layer == layer);
            self.tile_layer = layer;
        }

        let now = Instant::now();
        for key in missing {
            if self.pending_tiles.len() >= MAX_TILES_IN_FLIGHT {
                break;
            }
            if self.pending_tiles.contains(&key) || self.failed_tiles.is_cooling_down(&key, now) {
                continue;
            }

            let (layer, tile) = key;
            let retriever = self.tile_retriever.clone();
            let sender = self.sender.clone();
            let requester = ctx.clone();

            self.runtime.spawn(async move {
                let result = retriever.fetch_tile(layer, tile).await;
                if sender.send(Fetched::Tile(key, result)).is_ok() {
                    requester.request_repaint();
                }
            });
            self.pending_tiles.insert(key);
        }
    }

    /// Texture for `reference`, kicking off a load the first time it is asked for.
    fn image(&mut self, ctx: &egui::Context, reference: &str) -> Option<egui::TextureHandle> {
        if let Some(texture) = self.images.get(reference) {
            return Some(texture.clone());
        }
        let reference = reference.to_string();
        if self.pending_images.contains(&reference)
            || self.failed_images.is_cooling_down(&reference, Instant::now())
        {
            return None;
        }

        let loader = self.asset_loader.clone();
        let sender = self.sender.clone();
        let requester = ctx.clone();
        self.pending_images.insert(reference.clone());

        self.runtime.spawn(async move {
            let result = loader.load(&reference).await;
            if sender.send(Fetched::Image(reference, result)).is_ok() {
                requester.request_repaint();
            }
        });
        None
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Jogja Map");
            ui.separator();

            let mut chosen = None;
            egui::ComboBox::from_id_salt("location_select")
                .width(320.0)
                .selected_text(self.screen.selected_label().unwrap_or("Choose a location"))
                .show_ui(ui, |ui| {
                    for location in self.screen.locations() {
                        let selected = self.screen.selected_label() == Some(location.label);
                        if ui.selectable_label(selected, location.label).clicked() {
                            chosen = Some(location.label);
                        }
                    }
                });
            if let Some(label) = chosen {
                self.screen.select_by_label(label);
            }

            if ui.button("Reset").clicked() {
                self.screen.reset();
                // Give tiles and images that failed before another chance.
                self.failed_tiles.clear();
                self.failed_images.clear();
            }
        });
    }

    fn map_panel(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        let marker_icon = self.image(&ctx, MARKER_ICON);
        let popup_image = match self.screen.map().popup().and_then(|p| p.content.image_url) {
            Some(reference) => self.image(&ctx, reference),
            None => None,
        };

        let mut output = MapOutput::default();
        let (view, markers) = self.screen.parts_mut();
        let response = ui.add(
            Map::new(view, markers, &mut self.tile_cache, &mut output)
                .marker_icon(marker_icon.as_ref())
                .popup_image(popup_image.as_ref()),
        );

        let map_rect = response.rect;
        layer_control(&ctx, map_rect, self.screen.map_mut());
        zoom_buttons(&ctx, map_rect, self.screen.map_mut());
        attribution(&ctx, map_rect, self.screen.map());

        if let Some(id) = output.clicked_marker {
            self.screen.click_marker(id);
        } else if output.background_clicked || output.popup_closed {
            self.screen.map_mut().close_popup();
        }

        self.request_tiles(&ctx, output.missing_tiles);
    }
}

impl eframe::App for HomeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_fetched(ctx);
        self.screen.on_view_entered();

        egui::TopBottomPanel::top("toolbar")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(8.0))
            .show(ctx, |ui| self.toolbar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.map_panel(ui));
    }
}
