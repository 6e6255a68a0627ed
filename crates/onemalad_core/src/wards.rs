//! Static ward, corporator and place data for Malad West.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    pub number: u32,
    pub name: &'static str,
    pub zone: &'static str,
    pub area: &'static str,
    pub description: &'static str,
    pub landmarks: &'static [&'static str],
    pub population: u32,
    pub voters: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Corporator {
    pub id: &'static str,
    pub name: &'static str,
    pub party: &'static str,
    pub ward_number: u32,
    pub votes: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Place {
    pub slug: &'static str,
    pub name: &'static str,
}

pub const WARDS: &[Ward] = &[
    Ward {
        number: 32,
        name: "P North Ward 32",
        zone: "P-North",
        area: "Malad West",
        description: "Jankalyan Old MHADA to Marve and Manori Village, including the coastal stretch of Marve.",
        landmarks: &["Jankalyan Old MHADA", "Jankalyan", "Marve", "Manori Village"],
        population: 85_000,
        voters: 38_450,
    },
    Ward {
        number: 33,
        name: "P North Ward 33",
        zone: "P-North",
        area: "Malad West",
        description: "Rathodi and Malwani 6 No, a dense residential ward of housing colonies and local markets.",
        landmarks: &["Rathodi", "Malwani 6 No"],
        population: 92_000,
        voters: 42_680,
    },
    Ward {
        number: 34,
        name: "P North Ward 34",
        zone: "P-North",
        area: "Malad West",
        description: "Malwani 1 No to NCC, including the Gate 6 and Gate 7 areas.",
        landmarks: &["Malwani 1 No", "NCC", "Gate 6", "Gate 7"],
        population: 110_000,
        voters: 51_230,
    },
    Ward {
        number: 48,
        name: "P South Ward 48",
        zone: "P-South",
        area: "Malad West",
        description: "Malwani MHADA colony and Malwani 7 No, with government housing and community facilities.",
        landmarks: &["Malwani MHADA", "Malwani 7 No"],
        population: 78_000,
        voters: 35_120,
    },
    Ward {
        number: 49,
        name: "P South Ward 49",
        zone: "P-South",
        area: "Malad West",
        description: "Madh Island and Ambujwadi, including the historic fort and jetty.",
        landmarks: &["Madh Island", "Ambujwadi", "Madh Jetty", "Madh Fort"],
        population: 72_000,
        voters: 32_540,
    },
];

pub const CORPORATORS: &[Corporator] = &[
    Corporator {
        id: "corp-32",
        name: "Geeta Kiran Bhandari",
        party: "Shiv Sena (UBT)",
        ward_number: 32,
        votes: 8_677,
    },
    Corporator {
        id: "corp-33",
        name: "Qumarjahan Siddiqui",
        party: "Indian National Congress",
        ward_number: 33,
        votes: 12_644,
    },
    Corporator {
        id: "corp-34",
        name: "Haider Aslam Shaikh",
        party: "Indian National Congress",
        ward_number: 34,
        votes: 16_622,
    },
    Corporator {
        id: "corp-48",
        name: "Rafiq Iliyas Shaikh",
        party: "Indian National Congress",
        ward_number: 48,
        votes: 13_154,
    },
    Corporator {
        id: "corp-49",
        name: "Sangeeta Chandrakant Koli",
        party: "Indian National Congress",
        ward_number: 49,
        votes: 10_733,
    },
];

pub const PLACES: &[Place] = &[
    Place { slug: "marve-beach", name: "Marve Beach" },
    Place { slug: "madh-fort", name: "Madh Fort" },
    Place { slug: "malwani", name: "Malwani" },
    Place { slug: "aksa-beach", name: "Aksa Beach" },
    Place { slug: "st-bonaventure-church", name: "St. Bonaventure Church" },
];

pub fn ward(number: u32) -> Option<&'static Ward> {
    WARDS.iter().find(|ward| ward.number == number)
}

pub fn corporator_for_ward(number: u32) -> Option<&'static Corporator> {
    CORPORATORS.iter().find(|corporator| corporator.ward_number == number)
}

pub fn is_known_ward(number: u32) -> bool {
    ward(number).is_some()
}
