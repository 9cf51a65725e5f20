use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{GymSource, ScrapeError, ScrapedGym};

pub const SOURCE_LABEL: &str = "Fallback Data";

/// A known branch kept in the bundled list
#[derive(Debug, Clone, Copy)]
pub struct KnownLocation {
    pub name: &'static str,
    pub address: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Amenities every branch of the chain advertises
pub fn default_amenities() -> Vec<String> {
    [
        "Weights",
        "Cardio Equipment",
        "Functional Training Area",
        "Free Wi-Fi",
        "24/7 Access",
        "CCTV Security",
        "Air Conditioning",
        "Changing Rooms",
        "Lockers",
        "Water Stations",
    ]
    .iter()
    .map(|a| a.to_string())
    .collect()
}

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Branch page slug: lowercase, every whitespace run (edges included)
/// becomes `-`, anything outside `[a-z0-9-]` is dropped
pub fn location_slug(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&name.to_lowercase(), "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Bundled branch list, used when the live sources come back empty
pub struct StaticListSource {
    site_url: String,
    locations: &'static [KnownLocation],
}

impl StaticListSource {
    pub fn new(site_url: &str) -> Self {
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
            locations: KNOWN_LOCATIONS,
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// The list as scraped gyms, each linked to its branch page
    pub fn gyms(&self) -> Vec<ScrapedGym> {
        self.locations
            .iter()
            .map(|loc| {
                ScrapedGym::new(loc.name, loc.address, loc.latitude, loc.longitude, SOURCE_LABEL)
                    .with_amenities(default_amenities())
                    .with_website(Some(format!("{}/gyms/{}", self.site_url, location_slug(loc.name))))
            })
            .collect()
    }
}

#[async_trait]
impl GymSource for StaticListSource {
    fn name(&self) -> &str {
        SOURCE_LABEL
    }

    async fn fetch(&self) -> Result<Vec<ScrapedGym>, ScrapeError> {
        Ok(self.gyms())
    }
}

pub static KNOWN_LOCATIONS: &[KnownLocation] = &[
    KnownLocation {
        name: "PureGym London Bank",
        address: "86-90 Cannon Street, London EC4N 6HA",
        latitude: 51.5127,
        longitude: -0.0907,
    },
    KnownLocation {
        name: "PureGym London Liverpool Street",
        address: "1 Appold Street, London EC2A 2UU",
        latitude: 51.5194,
        longitude: -0.0831,
    },
    KnownLocation {
        name: "PureGym Manchester City Centre",
        address: "Portland Street, Manchester M1 3LA",
        latitude: 53.4794,
        longitude: -2.2453,
    },
    KnownLocation {
        name: "PureGym Birmingham City Centre",
        address: "52-58 New Street, Birmingham B2 4BA",
        latitude: 52.4796,
        longitude: -1.8951,
    },
    KnownLocation {
        name: "PureGym Leeds City Centre",
        address: "Merrion Centre, Leeds LS2 8NG",
        latitude: 53.8059,
        longitude: -1.5509,
    },
    KnownLocation {
        name: "PureGym Liverpool City Centre",
        address: "14-18 Renshaw Street, Liverpool L1 2SJ",
        latitude: 53.4084,
        longitude: -2.9844,
    },
    KnownLocation {
        name: "PureGym Glasgow City Centre",
        address: "220 Buchanan Street, Glasgow G1 2GF",
        latitude: 55.8609,
        longitude: -4.2514,
    },
    KnownLocation {
        name: "PureGym Edinburgh City Centre",
        address: "108 Rose Street, Edinburgh EH2 3JF",
        latitude: 55.9533,
        longitude: -3.1883,
    },
    KnownLocation {
        name: "PureGym Newcastle City Centre",
        address: "45-51 Grainger Street, Newcastle NE1 5JE",
        latitude: 54.9738,
        longitude: -1.6131,
    },
    KnownLocation {
        name: "PureGym Bristol City Centre",
        address: "The Galleries, Broadmead, Bristol BS1 3XD",
        latitude: 51.4545,
        longitude: -2.5879,
    },
    KnownLocation {
        name: "PureGym Cardiff City Centre",
        address: "Queen Street, Cardiff CF10 2BY",
        latitude: 51.4816,
        longitude: -3.1791,
    },
    KnownLocation {
        name: "PureGym Sheffield City Centre",
        address: "The Moor, Sheffield S1 4PF",
        latitude: 53.3781,
        longitude: -1.4598,
    },
    KnownLocation {
        name: "PureGym Leicester City Centre",
        address: "Gallowtree Gate, Leicester LE1 5AD",
        latitude: 52.6369,
        longitude: -1.1398,
    },
    KnownLocation {
        name: "PureGym Nottingham City Centre",
        address: "Victoria Centre, Nottingham NG1 3QN",
        latitude: 52.9548,
        longitude: -1.1581,
    },
    KnownLocation {
        name: "PureGym Norwich City Centre",
        address: "Chapelfield, Norwich NR2 1SU",
        latitude: 52.6309,
        longitude: 1.2974,
    },
    KnownLocation {
        name: "PureGym Oxford City Centre",
        address: "Westgate Centre, Oxford OX1 1TR",
        latitude: 51.7520,
        longitude: -1.2577,
    },
    KnownLocation {
        name: "PureGym Reading City Centre",
        address: "The Oracle, Reading RG1 2AG",
        latitude: 51.4543,
        longitude: -0.9781,
    },
    KnownLocation {
        name: "PureGym Cambridge City Centre",
        address: "Grand Arcade, Cambridge CB2 3BJ",
        latitude: 52.2053,
        longitude: 0.1218,
    },
    KnownLocation {
        name: "PureGym Portsmouth City Centre",
        address: "Commercial Road, Portsmouth PO1 4BU",
        latitude: 50.8198,
        longitude: -1.0880,
    },
    KnownLocation {
        name: "PureGym Southampton City Centre",
        address: "West Quay, Southampton SO15 1QD",
        latitude: 50.9097,
        longitude: -1.4044,
    },
    KnownLocation {
        name: "PureGym Brighton City Centre",
        address: "Churchill Square, Brighton BN1 2RG",
        latitude: 50.8225,
        longitude: -0.1372,
    },
    KnownLocation {
        name: "PureGym Milton Keynes",
        address: "Midsummer Boulevard, Milton Keynes MK9 2EA",
        latitude: 52.0406,
        longitude: -0.7594,
    },
    KnownLocation {
        name: "PureGym Coventry City Centre",
        address: "West Orchards, Coventry CV1 1QX",
        latitude: 52.4081,
        longitude: -1.5106,
    },
    KnownLocation {
        name: "PureGym Stoke-on-Trent",
        address: "The Potteries Centre, Stoke-on-Trent ST1 1PS",
        latitude: 53.0282,
        longitude: -2.1831,
    },
    KnownLocation {
        name: "PureGym Derby City Centre",
        address: "Intu Derby, Derby DE1 2PQ",
        latitude: 52.9225,
        longitude: -1.4746,
    },
    KnownLocation {
        name: "PureGym Hull City Centre",
        address: "Prospect Centre, Hull HU2 8PW",
        latitude: 53.7456,
        longitude: -0.3367,
    },
    KnownLocation {
        name: "PureGym York City Centre",
        address: "Coney Street, York YO1 9QL",
        latitude: 53.9591,
        longitude: -1.0815,
    },
    KnownLocation {
        name: "PureGym Exeter City Centre",
        address: "Princesshay, Exeter EX1 1GE",
        latitude: 50.7236,
        longitude: -3.5275,
    },
    KnownLocation {
        name: "PureGym Plymouth City Centre",
        address: "Drake Circus, Plymouth PL1 1EA",
        latitude: 50.3755,
        longitude: -4.1427,
    },
    KnownLocation {
        name: "PureGym Bournemouth",
        address: "Old Christchurch Road, Bournemouth BH1 1DH",
        latitude: 50.7192,
        longitude: -1.8808,
    },
    KnownLocation {
        name: "PureGym Bath City Centre",
        address: "SouthGate, Bath BA1 1AP",
        latitude: 51.3811,
        longitude: -2.3590,
    },
    KnownLocation {
        name: "PureGym Swindon",
        address: "The Parade, Swindon SN1 1BA",
        latitude: 51.5557,
        longitude: -1.7797,
    },
    KnownLocation {
        name: "PureGym Gloucester",
        address: "Eastgate Centre, Gloucester GL1 1RU",
        latitude: 51.8642,
        longitude: -2.2444,
    },
    KnownLocation {
        name: "PureGym Northampton",
        address: "Grosvenor Centre, Northampton NN1 2EL",
        latitude: 52.2405,
        longitude: -0.8930,
    },
    KnownLocation {
        name: "PureGym Peterborough",
        address: "Queensgate Centre, Peterborough PE1 1NT",
        latitude: 52.5755,
        longitude: -0.2405,
    },
    KnownLocation {
        name: "PureGym Ipswich",
        address: "Westgate Centre, Ipswich IP1 3EL",
        latitude: 52.0567,
        longitude: 1.1482,
    },
    KnownLocation {
        name: "PureGym Canterbury",
        address: "Whitefriars Centre, Canterbury CT1 2TF",
        latitude: 51.2802,
        longitude: 1.0789,
    },
    KnownLocation {
        name: "PureGym Wolverhampton",
        address: "Mander Centre, Wolverhampton WV1 3NH",
        latitude: 52.5842,
        longitude: -2.1284,
    },
    KnownLocation {
        name: "PureGym Bradford",
        address: "The Broadway, Bradford BD1 1JF",
        latitude: 53.7960,
        longitude: -1.7594,
    },
    KnownLocation {
        name: "PureGym Stockport",
        address: "Merseyway Centre, Stockport SK1 1PJ",
        latitude: 53.4106,
        longitude: -2.1575,
    },
    KnownLocation {
        name: "PureGym Warrington",
        address: "Golden Square, Warrington WA1 1QB",
        latitude: 53.3900,
        longitude: -2.5970,
    },
    KnownLocation {
        name: "PureGym Lincoln",
        address: "High Street, Lincoln LN5 7AT",
        latitude: 53.2307,
        longitude: -0.5406,
    },
    KnownLocation {
        name: "PureGym Cannock",
        address: "Market Hall, Cannock WS11 1EB",
        latitude: 52.6906,
        longitude: -2.0319,
    },
    KnownLocation {
        name: "PureGym Aberdeen City Centre",
        address: "Union Street, Aberdeen AB10 1HE",
        latitude: 57.1497,
        longitude: -2.0943,
    },
    KnownLocation {
        name: "PureGym Belfast City Centre",
        address: "Victoria Square, Belfast BT1 4QG",
        latitude: 54.5973,
        longitude: -5.9301,
    },
];
