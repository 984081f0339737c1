use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Categories inserted into an empty catalog: (name, description).
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Tinto", "Vinos tintos con cuerpo y estructura"),
    ("Blanco", "Vinos blancos frescos y aromáticos"),
    ("Rosado", "Vinos rosados ligeros y afrutados"),
    ("Espumoso", "Vinos espumosos y champagnes"),
    ("Dulce", "Vinos dulces y de postre"),
];
