//! Entities shared by the integration tests.

use tabula::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub region: Option<String>,
}

impl Customer {
    pub fn new(name: &str) -> Self {
        Self {
            id: 0,
            name: name.into(),
            region: None,
        }
    }

    pub fn in_region(mut self, region: &str) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl Entity for Customer {
    const TABLE: &'static str = "Customers";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", DbType::BigInt)
                .identifier()
                .auto_generated()
                .field("id"),
            Column::new("Name", DbType::Text).size(100).field("name"),
            Column::new("Region", DbType::Text).nullable().field("region"),
            Column::to_many(
                "Orders",
                Relation {
                    target: "Orders".into(),
                    foreign_key: "CustomerId".into(),
                    local_key: "Id".into(),
                },
            )
            .field("orders"),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Self {
            id: record.get("id")?,
            name: record.get("name")?,
            region: record.get("region")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("name", self.name.as_str().into()),
            ("region", self.region.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub total: f64,
    pub status: String,
}

impl Order {
    pub fn new(customer_id: i64, total: f64) -> Self {
        Self {
            id: 0,
            customer_id,
            total,
            status: "new".into(),
        }
    }
}

impl Entity for Order {
    const TABLE: &'static str = "Orders";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", DbType::BigInt)
                .identifier()
                .auto_generated()
                .field("id"),
            Column::new("CustomerId", DbType::BigInt).field("customer_id"),
            Column::new("Total", DbType::Double).field("total"),
            Column::new("Status", DbType::Text)
                .default_value("new")
                .field("status"),
            Column::new("Placed", DbType::Timestamp).computed(),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Self {
            id: record.get("id")?,
            customer_id: record.get("customer_id")?,
            total: record.get("total")?,
            status: record.get::<Option<String>>("status")?.unwrap_or_default(),
        })
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("customer_id", self.customer_id.into()),
            ("total", self.total.into()),
            ("status", self.status.as_str().into()),
        ]
    }
}

/// Keyed by a sequence on dialects that have them.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

impl Entity for Product {
    const TABLE: &'static str = "Products";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", DbType::BigInt)
                .identifier()
                .sequence("product_seq")
                .field("id"),
            Column::new("Name", DbType::Text).field("name"),
            Column::new("Price", DbType::Double).field("price"),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Self {
            id: record.get("id")?,
            name: record.get("name")?,
            price: record.get("price")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("name", self.name.as_str().into()),
            ("price", self.price.into()),
        ]
    }
}

/// Composite key, nothing generated.
#[derive(Debug, Clone, PartialEq)]
pub struct TagLink {
    pub post_id: i64,
    pub tag: String,
    pub weight: i32,
}

impl Entity for TagLink {
    const TABLE: &'static str = "TagLinks";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("PostId", DbType::BigInt).identifier().field("post_id"),
            Column::new("Tag", DbType::Text).identifier().field("tag"),
            Column::new("Weight", DbType::Integer).field("weight"),
        ]
    }

    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Self {
            post_id: record.get("post_id")?,
            tag: record.get("tag")?,
            weight: record.get("weight")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("post_id", self.post_id.into()),
            ("tag", self.tag.as_str().into()),
            ("weight", self.weight.into()),
        ]
    }
}
