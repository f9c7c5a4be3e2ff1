use mongodb::bson::Document;
use mongodb::options::FindOptions;

/// Shaping applied to a find: which fields come back, in which order, and which window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindSpec {
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

impl FindSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// One page of `page_size` records, pages counted from zero.
    pub fn page(page: u64, page_size: u32) -> Self {
        Self::new().skip(page * page_size as u64).limit(page_size as i64)
    }
}

impl From<FindSpec> for FindOptions {
    fn from(spec: FindSpec) -> Self {
        FindOptions::builder()
            .projection(spec.projection)
            .sort(spec.sort)
            .skip(spec.skip)
            .limit(spec.limit)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;
    use mongodb::options::FindOptions;

    use super::FindSpec;

    #[test]
    fn test_pages_are_counted_from_zero() {
        assert_eq!(FindSpec::page(0, 5), FindSpec::new().skip(0).limit(5));
        assert_eq!(FindSpec::page(1, 5), FindSpec::new().skip(5).limit(5));
        assert_eq!(FindSpec::page(3, 10).skip, Some(30));
    }

    #[test]
    fn test_spec_converts_into_driver_options() {
        let spec = FindSpec::new()
            .projection(doc! { "title": 1, "author": 1, "price": 1, "_id": 0 })
            .sort(doc! { "price": -1 })
            .limit(5);

        let options: FindOptions = spec.into();
        assert_eq!(options.projection, Some(doc! { "title": 1, "author": 1, "price": 1, "_id": 0 }));
        assert_eq!(options.sort, Some(doc! { "price": -1 }));
        assert_eq!(options.skip, None);
        assert_eq!(options.limit, Some(5));
    }

    #[test]
    fn test_empty_spec_leaves_driver_defaults() {
        let options: FindOptions = FindSpec::new().into();
        assert!(options.projection.is_none());
        assert!(options.sort.is_none());
        assert!(options.skip.is_none());
        assert!(options.limit.is_none());
    }
}
