//! Case ("expediente") entity.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub case_number: String,
    pub external_user_id: Uuid,
    pub document_type: String,
    pub document_count: i32,
    pub folio_count: i32,
    pub subject: String,
    /// PENDIENTE, EN_PROCESO, RESUELTO, ARCHIVADO
    pub status: String,
    pub policy_accepted: bool,
    pub policy_accepted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::external_user::Entity",
        from = "Column::ExternalUserId",
        to = "super::external_user::Column::Id",
        on_delete = "Restrict"
    )]
    ExternalUser,
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachments,
    #[sea_orm(has_many = "super::movement::Entity")]
    Movements,
}

impl Related<super::external_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExternalUser.def()
    }
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl Related<super::movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
