use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Three-letter team code to full franchise name. Defunct codes map to the
/// successor franchise so old subscriptions keep working.
pub static TEAM_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ANA", "Anaheim Ducks"),
        ("BOS", "Boston Bruins"),
        ("BUF", "Buffalo Sabres"),
        ("CAR", "Carolina Hurricanes"),
        ("CBJ", "Columbus Blue Jackets"),
        ("CGY", "Calgary Flames"),
        ("CHI", "Chicago Blackhawks"),
        ("COL", "Colorado Avalanche"),
        ("DAL", "Dallas Stars"),
        ("DET", "Detroit Red Wings"),
        ("EDM", "Edmonton Oilers"),
        ("FLA", "Florida Panthers"),
        ("LAK", "Los Angeles Kings"),
        ("MIN", "Minnesota Wild"),
        ("MTL", "Montreal Canadiens"),
        ("NJD", "New Jersey Devils"),
        ("NSH", "Nashville Predators"),
        ("NYI", "New York Islanders"),
        ("NYR", "New York Rangers"),
        ("OTT", "Ottawa Senators"),
        ("PHI", "Philadelphia Flyers"),
        ("PIT", "Pittsburgh Penguins"),
        ("SEA", "Seattle Kraken"),
        ("SJS", "San Jose Sharks"),
        ("STL", "St. Louis Blues"),
        ("TBL", "Tampa Bay Lightning"),
        ("TOR", "Toronto Maple Leafs"),
        ("UTA", "Utah Hockey Club"),
        ("VAN", "Vancouver Canucks"),
        ("VGK", "Vegas Golden Knights"),
        ("WPG", "Winnipeg Jets"),
        ("WSH", "Washington Capitals"),
        // Defunct
        ("ARI", "Utah Hockey Club"),
    ])
});

pub fn team_name(code: &str) -> Option<&'static str> {
    TEAM_NAMES.get(code).copied()
}
