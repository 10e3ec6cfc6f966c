//! # Vetorizador — Provedor de Embeddings da Estratégia Semântica
//!
//! A estratégia semântica compara vetores de 768 dimensões gerados pelo
//! **BERTimbau** (`neuralmind/bert-base-portuguese-cased`), um BERT
//! pré-treinado para Português Brasileiro.
//!
//! ```text
//! Texto → Tokenizer → BERT Forward → Mean Pooling → L2 Normalize
//!                                         ↓
//!                                   Vec<f32> (768-dim)
//! ```
//!
//! O acesso ao modelo passa pela trait [`ProvedorEmbeddings`], a costura
//! que permite aos testes substituir o BERT por um provedor determinístico
//! e ao orquestrador degradar a estratégia quando o provedor não está
//! disponível.
//!
//! ## Carregamento
//!
//! O modelo é baixado do HuggingFace Hub na primeira execução (~400 MB) e
//! cacheado em `~/.cache/huggingface/`. Estratégia de fallback:
//!
//! | Componente | Preferido | Fallback |
//! |-----------|-----------|----------|
//! | Tokenizer | `tokenizer.json` | `vocab.txt` (WordPiece) |
//! | Pesos | `model.safetensors` | `pytorch_model.bin` |
//!
//! O device é sempre CPU: suficiente para inferência de um BERT-base, e o
//! carregamento acontece em `spawn_blocking` no `main.rs` para não travar
//! o runtime do Tokio.

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert;
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;

/// Repositório HF do modelo de embeddings em PT-BR.
const REPO_MODELO: &str = "neuralmind/bert-base-portuguese-cased";

/// Provedor de embeddings para a estratégia semântica.
///
/// Implementações devem devolver vetores L2-normalizados, de modo que a
/// similaridade cosseno entre dois vetores seja o produto escalar.
pub trait ProvedorEmbeddings: Send + Sync {
    /// Gera o embedding de um texto único.
    fn vetorizar(&self, texto: &str) -> Result<Vec<f32>>;

    /// Gera embeddings de vários textos.
    ///
    /// A implementação padrão delega para [`vetorizar`](Self::vetorizar)
    /// texto a texto; implementações com suporte a batch sobrescrevem.
    fn vetorizar_lote(&self, textos: &[String]) -> Result<Vec<Vec<f32>>> {
        textos.iter().map(|t| self.vetorizar(t)).collect()
    }
}

/// Vetorizador BERTimbau: modelo BERT, tokenizer WordPiece e device.
pub struct VetorizadorBert {
    modelo: bert::BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl VetorizadorBert {
    /// Carrega o BERTimbau do HuggingFace Hub.
    ///
    /// Operação pesada de I/O e memória (~500 MB RAM); deve rodar fora do
    /// runtime async.
    ///
    /// # Erros
    ///
    /// Retorna erro se o Hub estiver inacessível, os arquivos do modelo
    /// estiverem corrompidos ou faltar memória.
    pub fn carregar() -> Result<Self> {
        let device = Device::Cpu;
        tracing::info!(repo = REPO_MODELO, "carregando BERTimbau do HuggingFace Hub");

        let api = Api::new().context("falha ao criar a API do HF Hub")?;
        let repo = api.model(REPO_MODELO.to_string());

        let caminho_config = repo
            .get("config.json")
            .context("falha ao baixar config.json")?;

        // tokenizer.json quando existir; senão WordPiece manual de vocab.txt
        let tokenizer = match repo.get("tokenizer.json") {
            Ok(caminho) => Tokenizer::from_file(&caminho).map_err(|e| anyhow::anyhow!("{e}"))?,
            Err(_) => {
                tracing::info!("tokenizer.json ausente, montando WordPiece de vocab.txt");
                let vocab = repo.get("vocab.txt").context("falha ao baixar vocab.txt")?;
                montar_tokenizer_wordpiece(
                    vocab
                        .to_str()
                        .context("caminho de vocab.txt com encoding inválido")?,
                )?
            }
        };

        let config_str = std::fs::read_to_string(&caminho_config)?;
        let config: bert::Config =
            serde_json::from_str(&config_str).context("falha ao interpretar a config do modelo")?;

        // safetensors (mmap, seguro) com fallback para pytorch_model.bin
        let vb = match repo.get("model.safetensors") {
            Ok(caminho) => unsafe {
                VarBuilder::from_mmaped_safetensors(&[caminho], DType::F32, &device)
                    .context("falha ao carregar pesos safetensors")?
            },
            Err(_) => {
                tracing::info!("model.safetensors ausente, usando pytorch_model.bin");
                let caminho = repo
                    .get("pytorch_model.bin")
                    .context("falha ao baixar pytorch_model.bin")?;
                VarBuilder::from_pth(&caminho, DType::F32, &device)
                    .context("falha ao carregar pesos pytorch")?
            }
        };

        let modelo = bert::BertModel::load(vb, &config).context("falha ao instanciar o BERTimbau")?;
        tracing::info!("BERTimbau carregado");

        Ok(Self {
            modelo,
            tokenizer,
            device,
        })
    }

    /// Forward pass + mean pooling + L2 para um batch já tokenizado.
    ///
    /// O mean pooling pondera pela attention mask (tokens de padding não
    /// influenciam a média); a normalização L2 deixa os vetores prontos
    /// para similaridade cosseno via produto escalar.
    fn agrupar_e_normalizar(&self, saida: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let mask_expandida = mask
            .unsqueeze(2)?
            .to_dtype(DType::F32)?
            .broadcast_as(saida.shape())?;

        let mascarada = (saida * mask_expandida.clone())?;
        let somada = mascarada.sum(1)?;
        let soma_mask = mask_expandida.sum(1)?.clamp(1e-9, f64::MAX)?;
        let agrupada = (somada / soma_mask)?;

        let norma = agrupada.sqr()?.sum_keepdim(1)?.sqrt()?;
        Ok(agrupada.broadcast_div(&norma)?)
    }
}

impl ProvedorEmbeddings for VetorizadorBert {
    fn vetorizar(&self, texto: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(texto, true)
            .map_err(|e| anyhow::anyhow!("erro do tokenizer: {e}"))?;

        let ids = encoding.get_ids();
        let mask: Vec<u32> = encoding.get_attention_mask().to_vec();
        let tipos: Vec<u32> = vec![0u32; ids.len()];

        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(&tipos[..], &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(&mask[..], &self.device)?.unsqueeze(0)?;

        let saida = self
            .modelo
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let normalizada = self.agrupar_e_normalizar(&saida, &attention_mask)?;
        Ok(normalizada.squeeze(0)?.to_vec1()?)
    }

    fn vetorizar_lote(&self, textos: &[String]) -> Result<Vec<Vec<f32>>> {
        if textos.is_empty() {
            return Ok(Vec::new());
        }
        if textos.len() == 1 {
            return Ok(vec![self.vetorizar(&textos[0])?]);
        }

        let encodings: Vec<_> = textos
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(t.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("erro do tokenizer: {e}"))
            })
            .collect::<Result<Vec<_>>>()?;

        // padding até o texto mais longo do lote; a mask zera o excedente
        let maior = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let lote = encodings.len();
        let mut ids = vec![0u32; lote * maior];
        let tipos = vec![0u32; lote * maior];
        let mut mask = vec![0u32; lote * maior];

        for (i, enc) in encodings.iter().enumerate() {
            let offset = i * maior;
            for (j, &id) in enc.get_ids().iter().enumerate() {
                ids[offset + j] = id;
                mask[offset + j] = enc.get_attention_mask()[j];
            }
        }

        let input_ids = Tensor::from_vec(ids, (lote, maior), &self.device)?;
        let token_type_ids = Tensor::from_vec(tipos, (lote, maior), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (lote, maior), &self.device)?;

        let saida = self
            .modelo
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let normalizada = self.agrupar_e_normalizar(&saida, &attention_mask)?;

        let mut resultado = Vec::with_capacity(lote);
        for i in 0..lote {
            resultado.push(normalizada.get(i)?.to_vec1()?);
        }
        Ok(resultado)
    }
}

/// Monta um tokenizer WordPiece BERT a partir de `vocab.txt`.
///
/// O BERTimbau é *cased*: o normalizer preserva capitalização
/// (`lowercase = false`), relevante em Português para nomes próprios.
fn montar_tokenizer_wordpiece(caminho_vocab: &str) -> Result<Tokenizer> {
    use tokenizers::models::wordpiece::WordPiece;
    use tokenizers::normalizers::BertNormalizer;
    use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
    use tokenizers::processors::bert::BertProcessing;

    let wordpiece = WordPiece::from_file(caminho_vocab)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut tokenizer = Tokenizer::new(wordpiece);
    tokenizer.with_normalizer(Some(BertNormalizer::new(
        true,  // clean_text
        true,  // handle_chinese_chars
        None,  // strip_accents: padrão do modelo
        false, // lowercase: preservar capitalização
    )));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
    tokenizer.with_post_processor(Some(BertProcessing::new(
        ("[SEP]".to_string(), 102),
        ("[CLS]".to_string(), 101),
    )));

    Ok(tokenizer)
}
