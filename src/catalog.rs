use crate::media::Item;
use crate::tmdb::{requests, CatalogRequest, CatalogSource, ImageSize};

#[derive(Debug, Clone)]
pub struct CatalogRow {
    pub title: String,
    pub large: bool,
    request: Option<CatalogRequest>,
    items: Vec<Item>,
}

impl CatalogRow {
    pub fn fetched(title: &str, request: CatalogRequest) -> Self {
        Self {
            title: title.to_string(),
            large: false,
            request: Some(request),
            items: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn fixed(title: &str, items: Vec<Item>) -> Self {
        Self {
            title: title.to_string(),
            large: false,
            request: None,
            items,
        }
    }

    pub fn large(mut self) -> Self {
        self.large = true;
        self
    }

    pub fn request(&self) -> Option<CatalogRequest> {
        self.request
    }

    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    #[cfg(test)]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn displayable(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(|item| item.has_poster() && item.has_backdrop())
    }

    pub fn artwork<'a>(&self, item: &'a Item) -> Option<(&'a str, ImageSize)> {
        if self.large {
            item.poster_path.as_deref().map(|p| (p, ImageSize::Poster))
        } else {
            item.backdrop_path.as_deref().map(|p| (p, ImageSize::Original))
        }
    }
}

pub fn home_rows() -> Vec<CatalogRow> {
    vec![
        CatalogRow::fetched("NETFLIX ORIGINALS", requests::NETFLIX_ORIGINALS).large(),
        CatalogRow::fetched("Trending Now", requests::TRENDING),
        CatalogRow::fetched("Action", requests::ACTION),
        CatalogRow::fetched("Comedy", requests::COMEDY),
        CatalogRow::fetched("Horror", requests::HORROR),
        CatalogRow::fetched("Romance", requests::ROMANCE),
        CatalogRow::fetched("Documentaries", requests::DOCUMENTARIES),
        CatalogRow::fetched("Animation", requests::ANIMATION),
    ]
}

pub async fn load_row<S: CatalogSource + ?Sized>(source: &S, request: CatalogRequest) -> Vec<Item> {
    source.listing(request).await.results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ListingPage;
    use crate::tmdb::fake::FakeCatalog;

    fn item(id: u64, poster: bool, backdrop: bool) -> Item {
        Item {
            id,
            poster_path: poster.then(|| format!("/p{id}.jpg")),
            backdrop_path: backdrop.then(|| format!("/b{id}.jpg")),
            title: Some(format!("Title {id}")),
            ..Default::default()
        }
    }

    #[test]
    fn fixed_row_does_not_fetch() {
        let row = CatalogRow::fixed("Picks", vec![item(1, true, true)]);
        assert_eq!(row.request(), None);
        assert_eq!(row.items().len(), 1);
    }

    #[test]
    fn only_items_with_both_images_are_displayed() {
        let row = CatalogRow::fixed(
            "Mixed",
            vec![
                item(1, true, true),
                item(2, false, true),
                item(3, true, false),
                item(4, true, true),
            ],
        );
        let ids: Vec<u64> = row.displayable().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn large_rows_use_posters() {
        let entry = item(5, true, true);
        let regular = CatalogRow::fixed("Regular", vec![]);
        let large = CatalogRow::fixed("Large", vec![]).large();

        assert!(matches!(
            regular.artwork(&entry),
            Some(("/b5.jpg", ImageSize::Original))
        ));
        assert!(matches!(large.artwork(&entry), Some(("/p5.jpg", ImageSize::Poster))));
    }

    #[test]
    fn home_rows_start_with_large_originals() {
        let rows = home_rows();
        assert_eq!(rows.len(), 8);
        assert!(rows[0].large);
        assert_eq!(rows[0].request(), Some(requests::NETFLIX_ORIGINALS));
        assert!(rows[1..].iter().all(|row| !row.large && row.request().is_some()));
    }

    #[tokio::test]
    async fn load_row_returns_listing_results() {
        let mut fake = FakeCatalog::default();
        fake.listings.insert(
            requests::TRENDING.path,
            ListingPage {
                results: vec![item(1, true, true), item(2, true, true)],
                page: 1,
                total_pages: 1,
            },
        );

        let items = load_row(&fake, requests::TRENDING).await;

        assert_eq!(items.len(), 2);
        assert_eq!(fake.calls(), vec!["listing /trending/all/week".to_string()]);
    }
}
