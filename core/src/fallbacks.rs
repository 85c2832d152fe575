//! Static vendor catalogue served when the catalogue endpoints are down.

use crate::types::{
    GeoPoint, VendorAddon, VendorAvailabilityHint, VendorContact, VendorDetail, VendorPackage,
    VendorPage, VendorSummary,
};

struct Seed {
    id: &'static str,
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    long_description: &'static str,
    category: &'static str,
    zone: &'static str,
    rating: f64,
    review_count: u32,
    starting_price: f64,
    tags: [&'static str; 3],
    availability: (&'static str, u32),
    package: (&'static str, &'static str, f64, &'static str),
    includes: [&'static str; 3],
    addon: (&'static str, f64),
    contact: (&'static str, &'static str, &'static str, &'static str),
    address: &'static str,
    location: (f64, f64),
    featured_in: &'static [&'static str],
}

static SEEDS: [Seed; 3] = [
    Seed {
        id: "vendor_maison_lanna",
        name: "Maison Lanna Collective",
        slug: "maison-lanna-collective",
        description: "Couture florals and immersive ceremony design rooted in Lanna craft.",
        long_description: "Botanical art, architectural lighting and site-specific \
            installations that honour Lanna heritage, each run by a dedicated design concierge.",
        category: "decoration",
        zone: "chiang-mai",
        rating: 4.9,
        review_count: 87,
        starting_price: 120_000.0,
        tags: ["couture florals", "immersive design", "lanna"],
        availability: ("available", 45),
        package: (
            "pkg_ml_01",
            "Lotus Reverie",
            185_000.0,
            "Ceremony florals with an on-site scent experience.",
        ),
        includes: [
            "Interactive floral mapping",
            "Hand-tied lotus cascade and ceremony entrance",
            "Fresh scent bar with a master perfumer",
        ],
        addon: ("Holographic procession lighting", 35_000.0),
        contact: (
            "+66912340000",
            "concierge@maisonlanna.com",
            "https://maisonlanna.com",
            "@maisonlanna",
        ),
        address: "78 Fing Bua Alley, Chiang Mai Old Town, Chiang Mai",
        location: (18.7883, 98.9853),
        featured_in: &["Vogue Wedding Thailand", "Thailand Tatler Celebrations"],
    },
    Seed {
        id: "vendor_silk_atelier",
        name: "Silk Atelier Chiang Mai",
        slug: "silk-atelier-chiang-mai",
        description: "Bespoke silk attire, ceremony dress and heirloom wardrobe design.",
        long_description: "A wearable archive inspired by Thai royal silhouettes and \
            contemporary couture, finished with hand-woven detail from artisan cooperatives.",
        category: "attire",
        zone: "bangkok",
        rating: 4.95,
        review_count: 132,
        starting_price: 65_000.0,
        tags: ["atelier", "bespoke silk", "heritage embroidery"],
        availability: ("waitlist", 75),
        package: (
            "pkg_sa_01",
            "Royal Heritage Capsule",
            230_000.0,
            "Three procession looks with bespoke jewellery styling.",
        ),
        includes: [
            "3D body scan fitting",
            "Hand-woven silk brocade with gold work",
            "Cultural symbolism consultation",
        ],
        addon: ("Lotus silk veil", 18_000.0),
        contact: (
            "+66876540000",
            "hello@silkatelier.co",
            "https://silkatelier.co",
            "@silkatelier",
        ),
        address: "18 Sukhumvit 31, Klongtoey Nua, Bangkok",
        location: (13.7427, 100.567),
        featured_in: &[],
    },
    Seed {
        id: "vendor_siam_symphony",
        name: "Siam Symphony",
        slug: "siam-symphony",
        description: "Bespoke music direction, live ensembles and ceremony soundscapes.",
        long_description: "Multi-sensory performances blending classical Thai instruments \
            with a modern ensemble, with set lists tuned from earlier celebrations.",
        category: "entertainment",
        zone: "bangkok",
        rating: 4.85,
        review_count: 64,
        starting_price: 90_000.0,
        tags: ["live orchestra", "sound design", "procession"],
        availability: ("available", 30),
        package: (
            "pkg_ss_01",
            "Celestial Ceremony Suite",
            145_000.0,
            "Procession orchestration, dinner concert and immersive scoring.",
        ),
        includes: [
            "Thai chamber orchestra with guest soloist",
            "Mood tuning for each ceremony moment",
            "Spatial sound engineering",
        ],
        addon: ("Sunrise blessing quartet", 25_000.0),
        contact: (
            "+66811230000",
            "events@siamsymphony.co",
            "https://siamsymphony.co",
            "@siamsymphony",
        ),
        address: "Charoen Krung Road, Bang Rak, Bangkok",
        location: (13.7246, 100.5146),
        featured_in: &[],
    },
];

impl Seed {
    fn detail(&self) -> VendorDetail {
        let (phone, email, website, handle) = self.contact;
        let (package_id, package_name, package_price, package_description) = self.package;
        VendorDetail {
            summary: VendorSummary {
                id: self.id.into(),
                name: self.name.into(),
                slug: self.slug.into(),
                logo: None,
                cover_image: None,
                description: Some(self.description.into()),
                category: self.category.into(),
                zone: self.zone.into(),
                rating: Some(self.rating),
                review_count: Some(self.review_count),
                verified: Some(true),
                starting_price: Some(self.starting_price),
                tags: self.tags.iter().map(|t| t.to_string()).collect(),
                availability: Some(VendorAvailabilityHint {
                    status: self.availability.0.into(),
                    lead_time_days: Some(self.availability.1),
                }),
            },
            long_description: Some(self.long_description.into()),
            address: Some(self.address.into()),
            location: Some(GeoPoint {
                lat: self.location.0,
                lng: self.location.1,
            }),
            contact: Some(VendorContact {
                phone: Some(phone.into()),
                email: Some(email.into()),
                website: Some(website.into()),
                line: Some(handle.into()),
                instagram: Some(handle.into()),
            }),
            packages: Some(vec![VendorPackage {
                id: package_id.into(),
                name: package_name.into(),
                price: Some(package_price),
                description: Some(package_description.into()),
                includes: self.includes.iter().map(|i| i.to_string()).collect(),
                addons: vec![VendorAddon {
                    name: self.addon.0.into(),
                    price: Some(self.addon.1),
                }],
            }]),
            featured_in: (!self.featured_in.is_empty())
                .then(|| self.featured_in.iter().map(|f| f.to_string()).collect()),
        }
    }
}

/// The full static catalogue as one page without pagination.
pub fn vendor_page() -> VendorPage {
    VendorPage {
        items: SEEDS.iter().map(|seed| seed.detail().summary).collect(),
        pagination: None,
    }
}

/// The static vendor whose id or slug matches, else the first one.
pub fn vendor_detail(id_or_slug: &str) -> VendorDetail {
    SEEDS
        .iter()
        .find(|seed| seed.id == id_or_slug || seed.slug == id_or_slug)
        .unwrap_or(&SEEDS[0])
        .detail()
}
