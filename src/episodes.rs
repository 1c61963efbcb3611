use std::collections::BTreeMap;

use itertools::Itertools;

use crate::catalog::Episode;

/// Season number to its episodes, both in ascending order
pub type SeasonGroups = BTreeMap<u32, Vec<Episode>>;

/// Group a flat episode list by season.
///
/// Season 0 (specials) is dropped. Episodes sharing a number keep their input order.
pub fn group_by_season(episodes: Vec<Episode>) -> SeasonGroups {
    let chunks = episodes
        .into_iter()
        .filter(|e| e.season != 0)
        .sorted_by_key(|e| (e.season, e.episode))
        .chunk_by(|e| e.season);

    let groups: SeasonGroups = chunks
        .into_iter()
        .map(|(season, eps)| (season, eps.collect()))
        .collect();
    groups
}

/// Episodes in display order, the order the episode list is navigated in
pub fn flatten(groups: &SeasonGroups) -> impl Iterator<Item = &Episode> {
    groups.values().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(id: &str, season: u32, episode: u32) -> Episode {
        Episode {
            id: id.to_string(),
            name: format!("Episode {}", id),
            overview: String::new(),
            season,
            episode,
            released: None,
        }
    }

    fn ids(eps: &[Episode]) -> Vec<&str> {
        eps.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_specials_are_dropped() {
        let groups = group_by_season(vec![ep("special", 0, 1), ep("a", 1, 1), ep("b", 1, 2)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[&1]), vec!["a", "b"]);
        assert!(!groups.contains_key(&0));
    }

    #[test]
    fn test_seasons_and_episodes_are_ordered() {
        let groups = group_by_season(vec![
            ep("s3e1", 3, 1),
            ep("s1e3", 1, 3),
            ep("s10e1", 10, 1),
            ep("s1e1", 1, 1),
            ep("s3e2", 3, 2),
            ep("s1e2", 1, 2),
        ]);

        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![1, 3, 10]);
        assert_eq!(ids(&groups[&1]), vec!["s1e1", "s1e2", "s1e3"]);
        assert_eq!(ids(&groups[&3]), vec!["s3e1", "s3e2"]);
        assert_eq!(ids(&groups[&10]), vec!["s10e1"]);
    }

    #[test]
    fn test_every_episode_lands_in_its_season_once() {
        let input = vec![ep("x", 2, 5), ep("y", 1, 1), ep("z", 0, 0), ep("w", 2, 1)];
        let groups = group_by_season(input.clone());

        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, input.iter().filter(|e| e.season != 0).count());

        for (season, eps) in &groups {
            assert!(eps.iter().all(|e| e.season == *season));
            assert!(eps.windows(2).all(|w| w[0].episode <= w[1].episode));
        }
    }

    #[test]
    fn test_duplicate_numbers_keep_input_order() {
        let groups = group_by_season(vec![ep("first", 1, 1), ep("later", 1, 2), ep("second", 1, 1)]);
        assert_eq!(ids(&groups[&1]), vec!["first", "second", "later"]);
    }

    #[test]
    fn test_empty_and_specials_only() {
        assert!(group_by_season(Vec::new()).is_empty());
        assert!(group_by_season(vec![ep("s", 0, 1), ep("t", 0, 2)]).is_empty());
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let input = vec![ep("b", 2, 1), ep("a", 1, 1), ep("c", 1, 2)];
        assert_eq!(group_by_season(input.clone()), group_by_season(input));
    }

    #[test]
    fn test_flatten_follows_display_order() {
        let groups = group_by_season(vec![ep("s2", 2, 1), ep("s1b", 1, 2), ep("s1a", 1, 1)]);
        let order: Vec<&str> = flatten(&groups).map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["s1a", "s1b", "s2"]);
    }
}
