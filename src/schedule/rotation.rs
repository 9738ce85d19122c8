use std::collections::HashMap;

/// Decides which priority vendor each house is designated for in a given week
pub trait RotationStrategy {
    fn designate(
        &self,
        houses: &[&str],
        priority_vendors: &[&str],
        week_index: usize,
    ) -> HashMap<String, String>;
}

/// Round-robin matrix: house `i` gets `priority_vendors[(i + week) % n]`
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinRotation;

impl RotationStrategy for RoundRobinRotation {
    fn designate(
        &self,
        houses: &[&str],
        priority_vendors: &[&str],
        week_index: usize,
    ) -> HashMap<String, String> {
        build_rotation_matrix(houses, priority_vendors, week_index)
    }
}

/// Builds the week's house -> priority vendor matrix. Empty when there are no priority vendors.
pub fn build_rotation_matrix(
    houses: &[&str],
    priority_vendors: &[&str],
    week_index: usize,
) -> HashMap<String, String> {
    if priority_vendors.is_empty() {
        return HashMap::new();
    }
    let vendor_count = priority_vendors.len();
    houses
        .iter()
        .enumerate()
        .map(|(house_index, house)| {
            let vendor = priority_vendors[(house_index + week_index % vendor_count) % vendor_count];
            (house.to_string(), vendor.to_string())
        })
        .collect()
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Number of weeks after which every house has met every priority vendor equally often
pub fn fairness_horizon(house_count: usize, vendor_count: usize) -> usize {
    if house_count == 0 || vendor_count == 0 {
        return 0;
    }
    house_count / gcd(house_count, vendor_count) * vendor_count
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUSES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
    const VENDORS: [&str; 4] = ["V1", "V2", "V3", "V4"];

    fn row(week: usize) -> Vec<String> {
        let matrix = build_rotation_matrix(&HOUSES, &VENDORS, week);
        HOUSES.iter().map(|h| matrix[*h].clone()).collect()
    }

    #[test]
    fn test_week_zero_matrix() {
        assert_eq!(row(0), vec!["V1", "V2", "V3", "V4", "V1", "V2"]);
    }

    #[test]
    fn test_week_one_shifts_by_one() {
        assert_eq!(row(1), vec!["V2", "V3", "V4", "V1", "V2", "V3"]);
    }

    #[test]
    fn test_four_weeks_cover_every_vendor_per_house() {
        for (house_index, house) in HOUSES.iter().enumerate() {
            let mut seen: Vec<String> = (0..4).map(|w| row(w)[house_index].clone()).collect();
            seen.sort();
            assert_eq!(seen, vec!["V1", "V2", "V3", "V4"], "house {}", house);
        }
    }

    #[test]
    fn test_uneven_counts_double_up_two_vendors_each_week() {
        // 6 houses over 4 vendors: every week two vendors serve two houses each
        for week in 0..4 {
            let r = row(week);
            let doubled = VENDORS
                .iter()
                .filter(|v| r.iter().filter(|x| x.as_str() == **v).count() == 2)
                .count();
            assert_eq!(doubled, 2, "week {}", week);
        }
    }

    #[test]
    fn test_fairness_over_lcm_horizon() {
        let horizon = fairness_horizon(HOUSES.len(), VENDORS.len());
        assert_eq!(horizon, 12);

        let mut counts: HashMap<(String, String), usize> = HashMap::new();
        for week in 0..horizon {
            for (house, vendor) in build_rotation_matrix(&HOUSES, &VENDORS, week) {
                *counts.entry((house, vendor)).or_insert(0) += 1;
            }
        }
        assert_eq!(counts.len(), HOUSES.len() * VENDORS.len());
        let min = counts.values().min().copied().unwrap();
        let max = counts.values().max().copied().unwrap();
        assert!(max - min <= 1);
    }

    #[test]
    fn test_empty_priority_list_gives_empty_matrix() {
        assert!(build_rotation_matrix(&HOUSES, &[], 3).is_empty());
        assert_eq!(fairness_horizon(6, 0), 0);
    }

    #[test]
    fn test_large_week_index_wraps() {
        assert_eq!(row(52), row(0));
        assert_eq!(
            build_rotation_matrix(&["A"], &["V1", "V2", "V3"], usize::MAX)["A"],
            VENDORS[usize::MAX % 3]
        );
    }
}
