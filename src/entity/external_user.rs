//! External user (citizen) entity, keyed by DNI.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "external_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub dni: String,
    pub email: String,
    pub first_names: String,
    pub last_names: String,
    pub phone: Option<String>,

    // Verification handshake
    pub email_verified: bool,
    pub verification_code: Option<String>,
    pub verification_expires_at: Option<DateTimeUtc>,
    pub verified_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::case_file::Entity")]
    Cases,
}

impl Related<super::case_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
