use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::map_tile::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BaseLayerId {
    #[default]
    Street,
    Topographic,
    Positron,
    DarkMatter,
}

impl BaseLayerId {
    pub const ALL: [BaseLayerId; 4] = [
        BaseLayerId::Street,
        BaseLayerId::Topographic,
        BaseLayerId::Positron,
        BaseLayerId::DarkMatter,
    ];

    pub fn layer(self) -> &'static BaseLayer {
        match self {
            BaseLayerId::Street => &BASE_LAYERS[0],
            BaseLayerId::Topographic => &BASE_LAYERS[1],
            BaseLayerId::Positron => &BASE_LAYERS[2],
            BaseLayerId::DarkMatter => &BASE_LAYERS[3],
        }
    }

    pub fn name(self) -> &'static str {
        self.layer().name
    }
}

impl fmt::Display for BaseLayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown base layer `{0}`")]
pub struct UnknownBaseLayer(pub String);

impl FromStr for BaseLayerId {
    type Err = UnknownBaseLayer;

    /// Accepts either the display name ("Dark Matter Map") or a short form
    /// ("dark-matter", "darkmatter", "dark matter"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let normalized = normalized.strip_suffix("map").unwrap_or(&normalized);

        match normalized {
            "street" | "osm" | "openstreet" => Ok(BaseLayerId::Street),
            "topographic" | "topo" | "opentopo" => Ok(BaseLayerId::Topographic),
            "positron" | "light" => Ok(BaseLayerId::Positron),
            "darkmatter" | "dark" => Ok(BaseLayerId::DarkMatter),
            _ => Err(UnknownBaseLayer(s.to_string())),
        }
    }
}

/// A raster tile source the user can pick in the layer control.
#[derive(Debug)]
pub struct BaseLayer {
    pub id: BaseLayerId,
    pub name: &'static str,
    /// `{s}` subdomain, `{z}/{x}/{y}` tile address, `{r}` retina suffix.
    pub url_template: &'static str,
    pub subdomains: &'static [&'static str],
    pub attribution: &'static str,
    pub attribution_url: &'static str,
    pub max_zoom: u8,
}

pub static BASE_LAYERS: [BaseLayer; 4] = [
    BaseLayer {
        id: BaseLayerId::Street,
        name: "Street Map",
        url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        subdomains: &["a", "b", "c"],
        attribution: "© OpenStreetMap contributors",
        attribution_url: "https://www.openstreetmap.org/copyright",
        max_zoom: 19,
    },
    BaseLayer {
        id: BaseLayerId::Topographic,
        name: "Topographic Map",
        url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        subdomains: &["a", "b", "c"],
        attribution: "© OpenTopoMap contributors",
        attribution_url: "https://opentopomap.org/",
        max_zoom: 17,
    },
    BaseLayer {
        id: BaseLayerId::Positron,
        name: "Positron Map",
        url_template: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
        subdomains: &["a", "b", "c"],
        attribution: "© CartoDB contributors",
        attribution_url: "https://carto.com/attributions",
        max_zoom: 20,
    },
    BaseLayer {
        id: BaseLayerId::DarkMatter,
        name: "Dark Matter Map",
        url_template: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
        subdomains: &["a", "b", "c"],
        attribution: "© CartoDB contributors",
        attribution_url: "https://carto.com/attributions",
        max_zoom: 20,
    },
];

impl BaseLayer {
    pub fn tile_url(&self, tile: TileId) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            self.subdomains[((tile.x as u64 + tile.y as u64) % self.subdomains.len() as u64) as usize]
        };

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{r}", "")
    }
}
