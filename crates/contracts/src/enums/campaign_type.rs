use serde::{Deserialize, Serialize};

/// Модели работы кампании Яндекс.Маркета
///
/// FBS и DBS различаются только идентификатором кампании и склада,
/// логика синхронизации остатков и цен для них общая.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignType {
    Fbs,
    Dbs,
}

impl CampaignType {
    /// Получить код модели работы
    pub fn code(&self) -> &'static str {
        match self {
            CampaignType::Fbs => "fbs",
            CampaignType::Dbs => "dbs",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            CampaignType::Fbs => "FBS",
            CampaignType::Dbs => "DBS",
        }
    }

    /// Все модели работы в порядке обхода при синхронизации
    pub fn all() -> Vec<CampaignType> {
        vec![CampaignType::Fbs, CampaignType::Dbs]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_type_codes() {
        assert_eq!(CampaignType::Fbs.code(), "fbs");
        assert_eq!(CampaignType::Dbs.code(), "dbs");
        assert_eq!(CampaignType::all(), vec![CampaignType::Fbs, CampaignType::Dbs]);
    }
}
