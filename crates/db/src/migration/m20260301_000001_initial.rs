//! Initial database migration.
//!
//! Creates companies, users, approval rules with their steps, expenses and
//! expense approvals. Built with the schema builder so the same migration
//! runs on Postgres and SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: TENANTS & IDENTITY
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Companies::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Companies::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Companies::BaseCurrencyCode)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Companies::Country).string_len(100).null())
                    .col(timestamp(Companies::CreatedAt))
                    .col(timestamp(Companies::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_companies_name")
                    .table(Companies::Table)
                    .col(Companies::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::ManagerId).uuid().null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_company_id")
                            .from(Users::Table, Users::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_manager_id")
                            .from(Users::Table, Users::ManagerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Team lookups walk manager_id.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_manager_id")
                    .table(Users::Table)
                    .col(Users::ManagerId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: APPROVAL RULES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ApprovalRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApprovalRules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApprovalRules::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(ApprovalRules::Name).string_len(255).not_null())
                    .col(ColumnDef::new(ApprovalRules::Description).text().null())
                    .col(
                        ColumnDef::new(ApprovalRules::IsManagerDefaultApprover)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ApprovalRules::MinApprovalPercentage)
                            .decimal_len(5, 2)
                            .null(),
                    )
                    .col(timestamp(ApprovalRules::CreatedAt))
                    .col(timestamp(ApprovalRules::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_rules_company_id")
                            .from(ApprovalRules::Table, ApprovalRules::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_approval_rules_company_created")
                    .table(ApprovalRules::Table)
                    .col(ApprovalRules::CompanyId)
                    .col(ApprovalRules::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApprovalFlowSteps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApprovalFlowSteps::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApprovalFlowSteps::RuleId).uuid().not_null())
                    .col(
                        ColumnDef::new(ApprovalFlowSteps::StepOrder)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApprovalFlowSteps::ApproverId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApprovalFlowSteps::IsRequired)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_flow_steps_rule_id")
                            .from(ApprovalFlowSteps::Table, ApprovalFlowSteps::RuleId)
                            .to(ApprovalRules::Table, ApprovalRules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_flow_steps_approver_id")
                            .from(ApprovalFlowSteps::Table, ApprovalFlowSteps::ApproverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_approval_flow_steps_rule_order")
                    .table(ApprovalFlowSteps::Table)
                    .col(ApprovalFlowSteps::RuleId)
                    .col(ApprovalFlowSteps::StepOrder)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: EXPENSES & APPROVALS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Expenses::RuleId).uuid().null())
                    .col(ColumnDef::new(Expenses::Amount).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Expenses::Currency).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Expenses::ConvertedAmount)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(ColumnDef::new(Expenses::Category).string_len(100).not_null())
                    .col(ColumnDef::new(Expenses::Description).text().null())
                    .col(ColumnDef::new(Expenses::ExpenseDate).date().not_null())
                    .col(
                        ColumnDef::new(Expenses::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Expenses::Remarks).text().null())
                    .col(timestamp(Expenses::CreatedAt))
                    .col(timestamp(Expenses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_company_id")
                            .from(Expenses::Table, Expenses::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_owner_id")
                            .from(Expenses::Table, Expenses::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_rule_id")
                            .from(Expenses::Table, Expenses::RuleId)
                            .to(ApprovalRules::Table, ApprovalRules::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_company_owner")
                    .table(Expenses::Table)
                    .col(Expenses::CompanyId)
                    .col(Expenses::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseApprovals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseApprovals::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseApprovals::ExpenseId).uuid().not_null())
                    .col(ColumnDef::new(ExpenseApprovals::ApproverId).uuid().not_null())
                    .col(ColumnDef::new(ExpenseApprovals::StepOrder).integer().not_null())
                    .col(
                        ColumnDef::new(ExpenseApprovals::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ExpenseApprovals::Comment).text().null())
                    .col(
                        ColumnDef::new(ExpenseApprovals::ActedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp(ExpenseApprovals::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_approvals_expense_id")
                            .from(ExpenseApprovals::Table, ExpenseApprovals::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_approvals_approver_id")
                            .from(ExpenseApprovals::Table, ExpenseApprovals::ApproverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (expense, approver).
        manager
            .create_index(
                Index::create()
                    .name("idx_expense_approvals_expense_approver")
                    .table(ExpenseApprovals::Table)
                    .col(ExpenseApprovals::ExpenseId)
                    .col(ExpenseApprovals::ApproverId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Approver inbox.
        manager
            .create_index(
                Index::create()
                    .name("idx_expense_approvals_approver_status")
                    .table(ExpenseApprovals::Table)
                    .col(ExpenseApprovals::ApproverId)
                    .col(ExpenseApprovals::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpenseApprovals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApprovalFlowSteps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApprovalRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveIden)]
enum Companies {
    Table,
    Id,
    Name,
    BaseCurrencyCode,
    Country,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    CompanyId,
    Name,
    Email,
    Role,
    ManagerId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ApprovalRules {
    Table,
    Id,
    CompanyId,
    Name,
    Description,
    IsManagerDefaultApprover,
    MinApprovalPercentage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ApprovalFlowSteps {
    Table,
    Id,
    RuleId,
    StepOrder,
    ApproverId,
    IsRequired,
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    CompanyId,
    OwnerId,
    RuleId,
    Amount,
    Currency,
    ConvertedAmount,
    Category,
    Description,
    ExpenseDate,
    Status,
    Remarks,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExpenseApprovals {
    Table,
    Id,
    ExpenseId,
    ApproverId,
    StepOrder,
    Status,
    Comment,
    ActedAt,
    CreatedAt,
}
