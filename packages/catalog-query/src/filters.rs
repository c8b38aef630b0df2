use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NftCategory {
	Wearable,
	Emote,
	Land,
	Ens,
	Parcel,
	Estate,
}
impl NftCategory {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Wearable => "wearable",
			Self::Emote => "emote",
			Self::Land => "land",
			Self::Ens => "ens",
			Self::Parcel => "parcel",
			Self::Estate => "estate",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
	Common,
	Uncommon,
	Rare,
	Epic,
	Legendary,
	Exotic,
	Mythic,
	Unique,
}
impl Rarity {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Common => "common",
			Self::Uncommon => "uncommon",
			Self::Rare => "rare",
			Self::Epic => "epic",
			Self::Legendary => "legendary",
			Self::Exotic => "exotic",
			Self::Mythic => "mythic",
			Self::Unique => "unique",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WearableCategory {
	Eyebrows,
	Eyes,
	FacialHair,
	Hair,
	Mouth,
	UpperBody,
	LowerBody,
	Feet,
	Earring,
	Eyewear,
	Hat,
	Helmet,
	Mask,
	Tiara,
	TopHead,
	Skin,
	HandsWear,
}
impl WearableCategory {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Eyebrows => "eyebrows",
			Self::Eyes => "eyes",
			Self::FacialHair => "facial_hair",
			Self::Hair => "hair",
			Self::Mouth => "mouth",
			Self::UpperBody => "upper_body",
			Self::LowerBody => "lower_body",
			Self::Feet => "feet",
			Self::Earring => "earring",
			Self::Eyewear => "eyewear",
			Self::Hat => "hat",
			Self::Helmet => "helmet",
			Self::Mask => "mask",
			Self::Tiara => "tiara",
			Self::TopHead => "top_head",
			Self::Skin => "skin",
			Self::HandsWear => "hands_wear",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmoteCategory {
	Dance,
	Stunt,
	Greetings,
	Fun,
	Poses,
	Reactions,
	Horror,
	Miscellaneous,
}
impl EmoteCategory {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Dance => "dance",
			Self::Stunt => "stunt",
			Self::Greetings => "greetings",
			Self::Fun => "fun",
			Self::Poses => "poses",
			Self::Reactions => "reactions",
			Self::Horror => "horror",
			Self::Miscellaneous => "miscellaneous",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotePlayMode {
	Loop,
	#[serde(alias = "simple")]
	Once,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderFilterOption {
	Male,
	Female,
	Unisex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
	Ethereum,
	#[serde(alias = "POLYGON")]
	Matic,
}
impl Network {
	/// Values the indexer stores in `network` columns for this network.
	pub fn db_networks(self) -> Vec<String> {
		match self {
			Self::Ethereum => vec!["ethereum".to_string()],
			Self::Matic => vec!["polygon".to_string()],
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSortBy {
	Newest,
	MostExpensive,
	RecentlyListed,
	RecentlySold,
	Cheapest,
	/// Any sort key this compiler does not know about.
	#[serde(other)]
	Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	Asc,
	#[default]
	Desc,
}
impl SortDirection {
	pub fn as_sql(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

/// A creator filter arrives either as one address or as a list of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Creator {
	One(String),
	Many(Vec<String>),
}
impl Creator {
	pub fn values(&self) -> &[String] {
		match self {
			Self::One(value) => std::slice::from_ref(value),
			Self::Many(values) => values.as_slice(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.values().is_empty()
	}
}

/// Catalog filter specification, already validated and defaulted by the request layer.
///
/// Every field is optional. Flag filters only constrain the result when set to `Some(true)`;
/// `is_on_sale` is the one tri-state filter where `Some(false)` selects unlisted items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilters {
	pub category: Option<NftCategory>,
	pub rarities: Vec<Rarity>,
	pub creator: Option<Creator>,
	pub contract_addresses: Vec<String>,
	pub ids: Vec<String>,
	pub urns: Vec<String>,
	pub search: Option<String>,

	pub wearable_category: Option<WearableCategory>,
	pub wearable_genders: Vec<GenderFilterOption>,
	pub is_wearable_head: Option<bool>,
	pub is_wearable_accessory: Option<bool>,
	pub is_wearable_smart: Option<bool>,

	pub emote_category: Option<EmoteCategory>,
	pub emote_play_mode: Vec<EmotePlayMode>,
	pub emote_has_sound: Option<bool>,
	pub emote_has_geometry: Option<bool>,
	pub emote_genders: Vec<GenderFilterOption>,

	pub is_on_sale: Option<bool>,
	pub is_sold_out: Option<bool>,
	pub only_listing: Option<bool>,
	pub only_minting: Option<bool>,
	/// Lower price bound in wei, as a decimal string.
	pub min_price: Option<String>,
	/// Upper price bound in wei, as a decimal string.
	pub max_price: Option<String>,
	pub network: Option<Network>,

	pub limit: Option<u32>,
	pub offset: Option<u32>,
	pub sort_by: Option<CatalogSortBy>,
	pub sort_direction: Option<SortDirection>,
}
impl CatalogFilters {
	/// The trimmed search term, when one was requested.
	pub fn search_term(&self) -> Option<&str> {
		self.search.as_deref().map(str::trim).filter(|term| !term.is_empty())
	}
}

pub(crate) fn is_set(flag: Option<bool>) -> bool {
	flag == Some(true)
}

/// Expands gender filter options into body-shape tokens, always ordered male first.
pub fn body_shapes(genders: &[GenderFilterOption]) -> Vec<String> {
	let unisex = genders.contains(&GenderFilterOption::Unisex);
	let male = unisex || genders.contains(&GenderFilterOption::Male);
	let female = unisex || genders.contains(&GenderFilterOption::Female);
	let mut shapes = Vec::with_capacity(2);

	if male {
		shapes.push("BaseMale".to_string());
	}
	if female {
		shapes.push("BaseFemale".to_string());
	}

	shapes
}

/// Resolves a play-mode set to a loop flag; `None` when both or neither mode is requested.
pub fn single_play_mode(modes: &[EmotePlayMode]) -> Option<bool> {
	let has_loop = modes.contains(&EmotePlayMode::Loop);
	let has_once = modes.contains(&EmotePlayMode::Once);

	match (has_loop, has_once) {
		(true, false) => Some(true),
		(false, true) => Some(false),
		_ => None,
	}
}
