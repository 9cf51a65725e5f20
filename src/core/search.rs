use crate::models::{Coordinates, Gym, GymSearchRequest, NearbyGym, PriceRange};

/// Case-insensitive substring match on name or address
#[inline]
pub fn matches_text(gym: &Gym, query: &str) -> bool {
    let needle = query.to_lowercase();
    gym.name.to_lowercase().contains(&needle) || gym.address.to_lowercase().contains(&needle)
}

/// Price tier membership; an empty filter accepts everything,
/// a gym with no tier never matches a non-empty filter.
#[inline]
pub fn matches_price(gym: &Gym, tiers: &[PriceRange]) -> bool {
    tiers.is_empty() || gym.price_range.map_or(false, |tier| tiers.contains(&tier))
}

/// The gym offers at least one of the wanted amenities
#[inline]
pub fn matches_amenities(gym: &Gym, wanted: &[String]) -> bool {
    wanted.is_empty() || wanted.iter().any(|amenity| gym.amenities.contains(amenity))
}

/// Apply every search predicate to an already-loaded gym list
///
/// Order is preserved, so a name-ordered input stays name-ordered.
pub fn filter_gyms(gyms: Vec<Gym>, params: &GymSearchRequest) -> Vec<Gym> {
    let origin = params.origin();
    let text = params.text();

    gyms.into_iter()
        .filter(|gym| text.map_or(true, |q| matches_text(gym, q)))
        .filter(|gym| matches_price(gym, &params.price_range))
        .filter(|gym| origin.distance_to(&gym.location) <= params.radius)
        .filter(|gym| matches_amenities(gym, &params.amenities))
        .collect()
}

/// Gyms within `radius_km` of `origin`, closest first
pub fn nearby_gyms(gyms: Vec<Gym>, origin: &Coordinates, radius_km: f64) -> Vec<NearbyGym> {
    let mut nearby: Vec<NearbyGym> = gyms
        .into_iter()
        .filter_map(|gym| {
            let distance_km = origin.distance_to(&gym.location);
            (distance_km <= radius_km).then_some(NearbyGym { gym, distance_km })
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OpeningHours;
    use chrono::Utc;
    use uuid::Uuid;

    fn gym(name: &str, lat: f64, lon: f64, amenities: &[&str], price: Option<PriceRange>) -> Gym {
        Gym {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: format!("{} High Street", name),
            location: Coordinates::new(lat, lon),
            amenities: amenities.iter().map(|a| a.to_string()).collect(),
            hours: OpeningHours::default(),
            images: vec![],
            rating: None,
            price_range: price,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn search(radius: f64) -> GymSearchRequest {
        GymSearchRequest {
            query: None,
            latitude: 51.5074,
            longitude: -0.1278,
            radius,
            amenities: vec![],
            price_range: vec![],
        }
    }

    #[test]
    fn test_nearby_sorted_and_bounded() {
        let gyms = vec![
            gym("Liverpool Street", 51.5194, -0.0831, &[], None),
            gym("Manchester", 53.4794, -2.2453, &[], None),
            gym("Bank", 51.5127, -0.0907, &[], None),
            gym("Holborn", 51.5174, -0.1200, &[], None),
        ];

        let nearby = nearby_gyms(gyms, &Coordinates::new(51.5074, -0.1278), 10.0);

        assert_eq!(nearby.len(), 3);
        assert_eq!(nearby[0].gym.name, "Holborn");
        assert!(nearby.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert!(nearby.iter().all(|n| n.distance_km <= 10.0));
    }

    #[test]
    fn test_amenities_any_of() {
        let g = gym("Bank", 51.5127, -0.0907, &["Sauna", "Weights"], None);
        assert!(matches_amenities(&g, &["Pool".to_string(), "Sauna".to_string()]));
        assert!(!matches_amenities(&g, &["Pool".to_string()]));
        assert!(matches_amenities(&g, &[]));
    }

    #[test]
    fn test_price_membership() {
        let budget = gym("Bank", 51.5127, -0.0907, &[], Some(PriceRange::Budget));
        let unknown = gym("Holborn", 51.5174, -0.12, &[], None);

        assert!(matches_price(&budget, &[PriceRange::Budget, PriceRange::Standard]));
        assert!(!matches_price(&budget, &[PriceRange::Premium]));
        assert!(!matches_price(&unknown, &[PriceRange::Budget]));
        assert!(matches_price(&unknown, &[]));
    }

    #[test]
    fn test_text_matches_name_or_address() {
        let g = gym("PureGym Bank", 51.5127, -0.0907, &[], None);
        assert!(matches_text(&g, "puregym"));
        assert!(matches_text(&g, "HIGH street"));
        assert!(!matches_text(&g, "gymbox"));
    }

    #[test]
    fn test_filter_combines_predicates() {
        let gyms = vec![
            gym("PureGym Bank", 51.5127, -0.0907, &["Weights"], Some(PriceRange::Budget)),
            gym("PureGym Holborn", 51.5174, -0.1200, &["Cardio"], Some(PriceRange::Budget)),
            gym("PureGym Manchester", 53.4794, -2.2453, &["Weights"], Some(PriceRange::Budget)),
            gym("Gymbox Bank", 51.5130, -0.0900, &["Weights"], Some(PriceRange::Premium)),
        ];

        let mut params = search(10.0);
        params.query = Some("  puregym ".to_string());
        params.amenities = vec!["Weights".to_string()];
        params.price_range = vec![PriceRange::Budget];

        let found = filter_gyms(gyms, &params);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "PureGym Bank");
    }
}
