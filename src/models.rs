use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Lookup Record ============

/// Company profile sub-record of a lookup result.
///
/// Field names follow the backend payload for the analytical evaluation row.
/// Every field is optional; the backend fills whatever the cache holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Principal {
    pub raiz: Option<String>,
    pub cnpj: Option<String>,
    pub razao_social: Option<String>,
    pub nome_fantasia: Option<String>,
    pub data_fundacao: Option<String>,
    pub endereco: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
    pub cep: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub cnae: Option<String>,
    pub descricao_atividade_fiscal: Option<String>,
    pub situacao_receita_federal: Option<String>,
    pub data_situacao_cadastral: Option<String>,
    pub situacao_sintegra: Option<String>,
    pub rating_atual: Option<String>,
    pub descricao_rating: Option<String>,
    pub total_debito_atual: Option<f64>,
    pub total_debito_vencido_05_dias: Option<f64>,
    pub total_debito_vencido_15_dias: Option<f64>,
    pub total_debito_vencido_30_dias: Option<f64>,
    pub total_limite_credito: Option<f64>,
    pub total_maior_acumulo: Option<f64>,
    pub qtd_associadas_vendas_ultimos_2meses: Option<i64>,
    pub data_maior_acumulo: Option<String>,
    pub data_ultima_compra: Option<String>,
    /// Peer code of the last recorded sale. Opaque; the backend sends either
    /// a number or a string depending on the source table.
    pub codigo_associada_ultima_compra: Option<Value>,
    pub data_inclusao_cisp: Option<String>,
    pub data_atualizacao: Option<String>,
    pub hora_modificacao: Option<String>,
    pub usuario_modificacao: Option<String>,
}

impl Principal {
    /// Structural emptiness: all identifying fields absent or blank.
    pub fn is_empty(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map_or(true, |s| s.is_empty())
        }
        blank(&self.razao_social)
            && blank(&self.cnpj)
            && blank(&self.nome_fantasia)
            && blank(&self.cidade)
            && blank(&self.uf)
    }
}

/// Restrictive-record entry reported by a peer institution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Restritiva {
    pub codigo_associada: Option<Value>,
    pub razao_social: Option<String>,
    pub codigo_primeira_restritiva: Option<Value>,
    pub descricao_primeira_restritiva: Option<String>,
    pub codigo_segunda_restritiva: Option<Value>,
    pub descricao_segunda_restritiva: Option<String>,
    pub data_ocorrencia: Option<String>,
    pub data_informacao: Option<String>,
}

/// Alert raised by a peer institution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Alerta {
    pub codigo_alerta: Option<Value>,
    pub descricao_alerta: Option<String>,
    pub associada_informante: Option<Value>,
    pub razao_social: Option<String>,
    pub data_atualizacao: Option<String>,
}

/// Monthly count of queries made against this root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultaMensal {
    pub mes_ano: Option<String>,
    pub quantidade_consultas: Option<i64>,
}

/// Peer institution reference (queried / declined-credit lists).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Associada {
    pub codigo_associada: Option<Value>,
    pub razao_social: Option<String>,
}

/// Rating history entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rating {
    pub data: Option<String>,
    pub classificacao: Option<String>,
    pub descricao_classificacao: Option<String>,
}

/// Positive-record row inside a segment group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Positiva {
    pub data_ultima_compra: Option<String>,
    pub data_maior_acumulo: Option<String>,
    pub valor_maior_acumulo: Option<f64>,
    pub razao_social: Option<String>,
    pub codigo_associada: Option<Value>,
    pub valor_debito_atual: Option<f64>,
    pub valor_limite_credito: Option<f64>,
}

/// Positive records grouped by business segment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositivaSegmento {
    pub descricao_segmento: Option<String>,
    pub total_associadas_segmento: Option<i64>,
    pub valor_total_debito_segmento: Option<f64>,
    pub positivas: Vec<Positiva>,
}

/// Extra counters computed by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Extras {
    pub tot_cheques_sem_fundo: Option<i64>,
    pub tot_titulos_protesto: Option<i64>,
}

/// Result of a data fetch for one root. Replaced wholesale by each fetch,
/// never merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupRecord {
    pub raiz: Option<String>,
    pub principal: Option<Principal>,
    pub restritivas: Vec<Restritiva>,
    pub alertas: Vec<Alerta>,
    pub consultas_mensais: Vec<ConsultaMensal>,
    pub associadas_consultaram: Vec<Associada>,
    pub associadas_nao_concederam: Vec<Associada>,
    pub ratings: Vec<Rating>,
    #[serde(rename = "positivaSegmentos")]
    pub positiva_segmentos: Vec<PositivaSegmento>,
    pub extras: Extras,
}

impl LookupRecord {
    /// A record is empty when its principal sub-record is absent or lacks
    /// every identifying field. Only presence matters here; business
    /// semantics of the figures are not validated.
    pub fn is_empty(&self) -> bool {
        self.principal.as_ref().map_or(true, |p| p.is_empty())
    }
}
